use std::env;
use std::path::{Path, PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=include/gifgen.h");
    println!("cargo:rerun-if-env-changed=FFMPEG_DIR");
    println!("cargo:rerun-if-env-changed=VCPKG_ROOT");
    println!("cargo:rerun-if-env-changed=VCPKGRS_TRIPLET");

    if let Some(ffmpeg_dir) = env::var_os("FFMPEG_DIR") {
        check_ffmpeg_dir(Path::new(&ffmpeg_dir));
        return;
    }

    // ffmpeg-sys-next finds FFmpeg through pkg-config everywhere except
    // Windows, where it needs FFMPEG_DIR.
    if env::var("CARGO_CFG_TARGET_OS").unwrap_or_default() == "windows" {
        suggest_vcpkg_dir();
    }
}

fn check_ffmpeg_dir(ffmpeg_dir: &Path) {
    let header = ffmpeg_dir.join("include").join("libavcodec").join("avcodec.h");
    if !header.exists() {
        println!(
            "cargo:warning=FFMPEG_DIR={} has no include/libavcodec/avcodec.h; gifgen needs the FFmpeg development headers.",
            ffmpeg_dir.display(),
        );
    }
}

fn suggest_vcpkg_dir() {
    let Ok(vcpkg_root) = env::var("VCPKG_ROOT") else {
        println!(
            "cargo:warning=FFMPEG_DIR is not set. On Windows, install FFmpeg (with avfilter) via vcpkg and set FFMPEG_DIR."
        );
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let candidate = PathBuf::from(&vcpkg_root).join("installed").join(&triplet);

    if candidate.exists() {
        println!(
            "cargo:warning=Found vcpkg FFmpeg at {}. Set FFMPEG_DIR={} to use it.",
            candidate.display(),
            candidate.display(),
        );
    } else {
        println!(
            "cargo:warning=VCPKG_ROOT is set but {} does not exist.",
            candidate.display(),
        );
    }
}
