//! Integration tests for the command-line workflow

#[cfg(test)]
mod cli_tests {
    use clap::Parser;
    use std::fs;
    use std::path::Path;
    use std::process::Command;
    use svgtrace::cli::{Args, CliConfig};
    use svgtrace::conversion::{ClusteringMode, Hierarchy};
    use tempfile::tempdir;

    fn run_svgtrace(args: &[&str]) -> (bool, String, String) {
        let output = Command::new(env!("CARGO_BIN_EXE_svgtrace"))
            .args(args)
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to run svgtrace");

        (
            output.status.success(),
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
        )
    }

    /// 24 x 24 white PNG with a dark square
    fn write_png(path: &Path) {
        let image = image::RgbaImage::from_fn(24, 24, |x, y| {
            if (6..18).contains(&x) && (6..18).contains(&y) {
                image::Rgba([10, 10, 10, 255])
            } else {
                image::Rgba([255, 255, 255, 255])
            }
        });
        image.save(path).unwrap();
    }

    #[test]
    fn test_converts_png_to_svg() {
        let tmp = tempdir().unwrap();
        let input = tmp.path().join("square.png");
        let output = tmp.path().join("nested/square.svg");
        write_png(&input);

        let (ok, _stdout, stderr) = run_svgtrace(&[
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--quiet",
        ]);
        assert!(ok, "svgtrace failed: {}", stderr);

        let svg = fs::read_to_string(&output).unwrap();
        assert!(svg.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(svg.contains("<!-- Generator: visioncortex VTracer -->"));
        assert!(svg.contains(r#"viewBox="0 0 24 24""#));
        assert!(svg.contains("<path"));
    }

    #[test]
    fn test_binary_preset_with_stats() {
        let tmp = tempdir().unwrap();
        let input = tmp.path().join("square.png");
        let output = tmp.path().join("bw.svg");
        write_png(&input);

        let (ok, stdout, stderr) = run_svgtrace(&[
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--preset",
            "bw",
            "--stats",
        ]);
        assert!(ok, "svgtrace failed: {}", stderr);
        assert!(stdout.contains("Conversion Statistics"));
        assert!(stdout.contains("\"outcome\": \"completed\""));
        assert!(output.exists());
    }

    #[test]
    fn test_print_config() {
        let (ok, stdout, _stderr) = run_svgtrace(&[
            "unused.png",
            "--print-config",
            "-f",
            "3",
            "-p",
            "8",
            "--hierarchical",
            "cutout",
        ]);
        assert!(ok);

        let wire: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
        assert_eq!(wire["filter_speckle"], 9);
        assert_eq!(wire["color_precision"], 0);
        assert_eq!(wire["hierarchical"], "cutout");
    }

    #[test]
    fn test_invalid_values_fail() {
        let (ok, _stdout, stderr) = run_svgtrace(&["in.png", "--filter-speckle", "40"]);
        assert!(!ok);
        assert!(stderr.contains("Filter speckle is invalid"));
    }

    #[test]
    fn test_missing_input_fails() {
        let tmp = tempdir().unwrap();
        let missing = tmp.path().join("nope.png");

        let (ok, _stdout, stderr) = run_svgtrace(&[missing.to_str().unwrap(), "--quiet"]);
        assert!(!ok);
        assert!(stderr.contains("nope.png"));
    }

    #[test]
    fn test_cli_config_from_args() {
        let args = Args::parse_from([
            "svgtrace",
            "in.png",
            "--colormode",
            "binary",
            "--hierarchical",
            "cutout",
            "--budget-ms",
            "10",
        ]);
        let config = CliConfig::from_args(args).unwrap();
        let conversion = config.conversion_config();

        assert_eq!(conversion.clustering_mode(), ClusteringMode::Binary);
        assert_eq!(conversion.hierarchical(), Hierarchy::Cutout);
        assert_eq!(config.slice.budget().as_millis(), 10);
    }
}
