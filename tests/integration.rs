// SPDX-License-Identifier: MPL-2.0
use image_rs::GenericImageView;
use std::fs;
use std::path::{Path, PathBuf};
use svgscale::config::{self, Config, RendererKind};
use svgscale::conversion::{
    output_path, Converter, RasterOptions, RasterRenderer, ThumbnailRenderer,
};
use svgscale::directory_scanner::SvgCatalog;
use svgscale::domain::{scale::PRESETS, ScaleFactor};
use svgscale::error::Error;
use tempfile::tempdir;

const ICON: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="8" viewBox="0 0 16 8">
  <rect x="0" y="0" width="16" height="8" fill="#e44"/>
</svg>"##;

const NO_SIZE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg"><circle cx="5" cy="5" r="5"/></svg>"#;

fn raster_converter(out_dir: &Path) -> Converter {
    let renderer = RasterRenderer::new(RasterOptions {
        load_system_fonts: false,
        ..RasterOptions::default()
    });
    Converter::new(Box::new(renderer), out_dir)
}

fn write_svg(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("failed to write svg");
    path
}

fn scale(value: f64) -> ScaleFactor {
    ScaleFactor::new(value).expect("valid scale")
}

#[test]
fn output_dimensions_follow_every_preset_scale() {
    let dir = tempdir().expect("failed to create temp dir");
    let input = write_svg(dir.path(), "icon.svg", ICON);
    let converter = raster_converter(&dir.path().join("out"));

    for value in PRESETS {
        let result = converter.convert(&input, scale(value)).expect("conversion failed");
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let expected = ((16.0 * value) as u32, (8.0 * value) as u32);
        assert_eq!((result.width, result.height), expected, "scale {value}");

        let decoded = image_rs::open(&result.output_path).expect("output is a png");
        assert_eq!(decoded.dimensions(), expected);
    }
}

#[test]
fn icon_at_2x_is_named_icon_2x_png() {
    let dir = tempdir().expect("failed to create temp dir");
    let input = write_svg(dir.path(), "icon.svg", ICON);
    let out_dir = dir.path().join("out");

    let result = raster_converter(&out_dir)
        .convert(&input, scale(2.0))
        .expect("conversion failed");

    assert_eq!(result.output_path, out_dir.join("icon-2x.png"));
    assert_eq!(
        output_path(Path::new("icon.svg"), Path::new("/out"), scale(2.0)),
        PathBuf::from("/out/icon-2x.png")
    );
}

#[test]
fn converting_twice_overwrites() {
    let dir = tempdir().expect("failed to create temp dir");
    let input = write_svg(dir.path(), "icon.svg", ICON);
    let converter = raster_converter(dir.path());

    let first = converter.convert(&input, scale(4.0)).expect("first run");
    let first_bytes = fs::read(&first.output_path).unwrap();
    let second = converter.convert(&input, scale(4.0)).expect("second run");

    assert_eq!(first.output_path, second.output_path);
    assert_eq!(fs::read(&second.output_path).unwrap(), first_bytes);
}

#[test]
fn missing_input_writes_nothing() {
    let dir = tempdir().expect("failed to create temp dir");
    let out_dir = dir.path().join("out");
    fs::create_dir(&out_dir).unwrap();

    match raster_converter(&out_dir).convert(&dir.path().join("ghost.svg"), scale(2.0)) {
        Err(Error::InputNotFound(_)) => {}
        other => panic!("expected InputNotFound, got {other:?}"),
    }
    assert_eq!(fs::read_dir(&out_dir).unwrap().count(), 0);
}

#[test]
fn unsized_svg_defaults_to_300_by_150() {
    let dir = tempdir().expect("failed to create temp dir");
    let input = write_svg(dir.path(), "dot.svg", NO_SIZE);

    let result = raster_converter(dir.path())
        .convert(&input, scale(4.0))
        .expect("conversion failed");

    assert_eq!((result.width, result.height), (1200, 600));
}

#[test]
fn malformed_svg_is_parse_error_and_writes_nothing() {
    let dir = tempdir().expect("failed to create temp dir");
    let input = write_svg(dir.path(), "broken.svg", "<svg><g></svg>");
    let out_dir = dir.path().join("out");

    match raster_converter(&out_dir).convert(&input, scale(1.0)) {
        Err(Error::Parse(_)) => {}
        other => panic!("expected Parse error, got {other:?}"),
    }
    assert!(!out_dir.join("broken-1x.png").exists());
}

#[test]
fn listing_returns_only_svgs_newest_first() {
    let dir = tempdir().expect("failed to create temp dir");
    let a = write_svg(dir.path(), "a.svg", ICON);
    fs::create_dir(dir.path().join("b")).unwrap();
    let nested = write_svg(&dir.path().join("b"), "nested.svg", ICON);
    fs::write(dir.path().join("c.txt"), "not an svg").unwrap();

    let epoch = std::time::SystemTime::UNIX_EPOCH;
    let touch = |path: &Path, secs: u64| {
        fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(epoch + std::time::Duration::from_secs(secs))
            .unwrap();
    };
    touch(&a, 10);
    touch(&nested, 20);

    let catalog = SvgCatalog::scan(dir.path()).expect("scan failed");
    let paths: Vec<_> = catalog.files().iter().map(|f| f.path.clone()).collect();
    assert_eq!(paths, vec![nested, a]);
}

#[test]
fn converter_from_config_file() {
    let dir = tempdir().expect("failed to create temp dir");
    let out_dir = dir.path().join("exports");
    let config_dir = dir.path().join("cfg");

    let mut settings = Config::default();
    settings.output.directory = Some(out_dir.clone());
    settings.output.renderer = Some(RendererKind::Raster);
    settings.raster.load_system_fonts = Some(false);
    config::save_with_override(&settings, Some(config_dir.clone())).expect("save failed");

    let (loaded, warning) = config::load_with_override(Some(config_dir));
    assert!(warning.is_none());

    let input = write_svg(dir.path(), "logo.svg", ICON);
    let result = Converter::from_config(&loaded)
        .convert(&input, loaded.default_scale())
        .expect("conversion failed");
    assert_eq!(result.output_path, out_dir.join("logo-1x.png"));
    assert_eq!((result.width, result.height), (16, 8));
}

#[cfg(unix)]
#[test]
fn thumbnail_renderer_end_to_end_with_stand_in_tool() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().expect("failed to create temp dir");
    let input = write_svg(dir.path(), "icon.svg", ICON);
    let out_dir = dir.path().join("out");

    // A real PNG for the stand-in tool to hand back.
    let fixture = dir.path().join("fixture.png");
    image_rs::RgbaImage::from_pixel(20, 20, image_rs::Rgba([0, 128, 0, 255]))
        .save(&fixture)
        .expect("failed to write fixture png");

    let tool = dir.path().join("thumbnailer");
    fs::write(
        &tool,
        format!(
            "#!/bin/sh\ncp '{}' \"$5/$(basename \"$6\").png\"\n",
            fixture.display()
        ),
    )
    .unwrap();
    fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

    let converter = Converter::new(Box::new(ThumbnailRenderer::new(&tool, None)), &out_dir);
    let result = converter.convert(&input, scale(2.0)).expect("conversion failed");

    assert_eq!(result.output_path, out_dir.join("icon-2x.png"));
    assert_eq!((result.width, result.height), (20, 20));
    // The per-invocation working directory has been removed.
    let leftovers: Vec<_> = fs::read_dir(&out_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from("icon-2x.png")]);
}
