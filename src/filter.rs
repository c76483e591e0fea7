//! Rotate/scale filter graph.
//!
//! Every sampled frame passes through
//! `buffer → [rotate] → scale → format=rgba → buffersink`. The graph is built
//! from the first decoded frame because raw streams only reveal their size
//! and pixel format once decoding starts.

use ffmpeg_next::filter::Graph as FilterGraph;
use ffmpeg_next::frame::Video as VideoFrame;
use ffmpeg_sys_next::AVPixelFormat;
use image::RgbaImage;

use crate::conversion::frame_to_buffer;
use crate::error::GifGenError;

/// Filter chain between the source and the sink.
pub(crate) fn filter_description(rotation: i32, width: u32) -> String {
    let mut chain = Vec::with_capacity(3);
    if rotation != 0 {
        chain.push(format!(
            "rotate='{rotation}*PI/180:ow=rotw({rotation}*PI/180):oh=roth({rotation}*PI/180)'"
        ));
    }
    chain.push(format!("scale={width}:-2"));
    chain.push("format=pix_fmts=rgba".to_string());
    chain.join(",")
}

pub(crate) struct RotateScaleFilter {
    graph: FilterGraph,
    filtered_frame: VideoFrame,
}

impl RotateScaleFilter {
    /// Build a graph accepting frames shaped like `template`.
    pub(crate) fn new(
        template: &VideoFrame,
        frames_per_second: u32,
        rotation: i32,
        width: u32,
    ) -> Result<Self, GifGenError> {
        let mut graph = FilterGraph::new();

        let pixel_format = AVPixelFormat::from(template.format()) as i32;
        let buffer_args = format!(
            "video_size={}x{}:pix_fmt={}:time_base=1/{}:pixel_aspect=1/1",
            template.width(),
            template.height(),
            pixel_format,
            frames_per_second.max(1),
        );

        graph
            .add(
                &ffmpeg_next::filter::find("buffer").ok_or_else(|| {
                    GifGenError::FilterGraphError("FFmpeg 'buffer' filter not found".to_string())
                })?,
                "in",
                &buffer_args,
            )
            .map_err(|e| GifGenError::FilterGraphError(format!("Failed to add buffer filter: {e}")))?;

        graph
            .add(
                &ffmpeg_next::filter::find("buffersink").ok_or_else(|| {
                    GifGenError::FilterGraphError(
                        "FFmpeg 'buffersink' filter not found".to_string(),
                    )
                })?,
                "out",
                "",
            )
            .map_err(|e| {
                GifGenError::FilterGraphError(format!("Failed to add buffersink filter: {e}"))
            })?;

        let description = filter_description(rotation, width);
        log::debug!("Filter graph: {description} (source {buffer_args})");

        graph
            .output("in", 0)
            .map_err(|e| GifGenError::FilterGraphError(format!("Filter graph output error: {e}")))?
            .input("out", 0)
            .map_err(|e| GifGenError::FilterGraphError(format!("Filter graph input error: {e}")))?
            .parse(&description)
            .map_err(|e| GifGenError::FilterGraphError(format!("Filter graph parse error: {e}")))?;

        graph
            .validate()
            .map_err(|e| GifGenError::FilterGraphError(format!("Filter graph validation: {e}")))?;

        Ok(Self {
            graph,
            filtered_frame: VideoFrame::empty(),
        })
    }

    /// Push one decoded frame and collect whatever the sink releases.
    pub(crate) fn push(
        &mut self,
        frame: &VideoFrame,
        output: &mut Vec<RgbaImage>,
    ) -> Result<(), GifGenError> {
        self.graph
            .get("in")
            .ok_or_else(|| GifGenError::FilterGraphError("Filter 'in' not found".to_string()))?
            .source()
            .add(frame)
            .map_err(|e| GifGenError::FilterGraphError(format!("Failed to feed filter: {e}")))?;
        self.drain(output)
    }

    /// Signal end of stream and collect the remaining frames.
    pub(crate) fn flush(&mut self, output: &mut Vec<RgbaImage>) -> Result<(), GifGenError> {
        self.graph
            .get("in")
            .ok_or_else(|| GifGenError::FilterGraphError("Filter 'in' not found".to_string()))?
            .source()
            .flush()
            .map_err(|e| GifGenError::FilterGraphError(format!("Failed to flush filter: {e}")))?;
        self.drain(output)
    }

    fn drain(&mut self, output: &mut Vec<RgbaImage>) -> Result<(), GifGenError> {
        loop {
            let received = self
                .graph
                .get("out")
                .ok_or_else(|| GifGenError::FilterGraphError("Filter 'out' not found".to_string()))?
                .sink()
                .frame(&mut self.filtered_frame)
                .is_ok();
            if !received {
                return Ok(());
            }
            output.push(rgba_image(&self.filtered_frame)?);
        }
    }
}

fn rgba_image(frame: &VideoFrame) -> Result<RgbaImage, GifGenError> {
    let (width, height) = (frame.width(), frame.height());
    let buffer = frame_to_buffer(frame, width, height, 4);
    RgbaImage::from_raw(width, height, buffer).ok_or_else(|| {
        GifGenError::FilterGraphError(format!("Filtered frame {width}x{height} is truncated"))
    })
}
