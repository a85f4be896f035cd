//! Task and pipeline tests against fixture trees.

use std::fs;
use std::path::Path;

use super::{extra, file_pattern, fonts, images, pages, scripts, styles};
use crate::config::BuildConfig;
use crate::context::PageContext;
use crate::pipeline;

/// Config rooted in a temp directory, with all roots created.
fn fixture_config(root: &Path) -> BuildConfig {
    let mut config = crate::config::test_parse_config("");
    config.root = root.to_path_buf();
    config.build.src = root.join("src");
    config.build.dist = root.join("dist");
    config.build.temp = root.join("temp");
    config.build.public = root.join("public");
    fs::create_dir_all(&config.build.src).unwrap();
    fs::create_dir_all(&config.build.public).unwrap();
    config
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

// ============================================================================
// Individual tasks
// ============================================================================

#[test]
fn test_styles_task_preserves_relative_path() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture_config(dir.path());
    write(
        &config.build.src.join("assets/styles/main.scss"),
        "$color: red;\nbody { color: $color; }\n",
    );

    let ctx = PageContext::from_config(&config);
    let report = styles::run(&config, &ctx).unwrap();
    assert_eq!(report.files, 1);

    let css = fs::read_to_string(config.build.temp.join("assets/styles/main.css")).unwrap();
    assert!(css.contains("color: red"));
    // expanded formatting, not compressed
    assert!(css.contains('\n'));
}

#[test]
fn test_styles_task_syntax_error_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture_config(dir.path());
    write(
        &config.build.src.join("assets/styles/bad.scss"),
        "body { color: ",
    );

    let ctx = PageContext::from_config(&config);
    assert!(styles::run(&config, &ctx).is_err());
}

#[test]
fn test_scripts_task_transpiles() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture_config(dir.path());
    write(
        &config.build.src.join("assets/scripts/app.js"),
        "const size = 2 ** 10;\n",
    );

    let ctx = PageContext::from_config(&config);
    let report = scripts::run(&config, &ctx).unwrap();
    assert_eq!(report.files, 1);

    let js = fs::read_to_string(config.build.temp.join("assets/scripts/app.js")).unwrap();
    assert!(js.contains("Math.pow"));
}

#[test]
fn test_pages_task_renders_context() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = fixture_config(dir.path());
    config.site.name = "demo-site".into();
    config.site.menus = vec![crate::config::MenuItem {
        name: "Home".into(),
        link: Some("index.html".into()),
        ..Default::default()
    }];
    write(
        &config.build.src.join("index.html"),
        "<title>{{ pkg.name }}</title>\n<ul>{% for menu in menus %}<li>{{ menu.name }}</li>{% endfor %}</ul>\n",
    );

    let ctx = PageContext::from_config(&config);
    pages::run(&config, &ctx).unwrap();

    let html = fs::read_to_string(config.build.temp.join("index.html")).unwrap();
    assert!(html.contains("<title>demo-site</title>"));
    assert!(html.contains("<li>Home</li>"));
}

#[test]
fn test_pages_task_only_top_level() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture_config(dir.path());
    write(&config.build.src.join("index.html"), "<p>top</p>");
    write(&config.build.src.join("partials/nav.html"), "<p>nested</p>");

    let ctx = PageContext::from_config(&config);
    let report = pages::run(&config, &ctx).unwrap();
    assert_eq!(report.files, 1);
    assert!(!config.build.temp.join("partials/nav.html").exists());
}

#[test]
fn test_file_pattern_extends_trailing_recursive_glob() {
    assert_eq!(file_pattern("**"), "**/*");
    assert_eq!(file_pattern("assets/images/**"), "assets/images/**/*");
    // literal patterns pass through untouched
    assert_eq!(file_pattern("*.html"), "*.html");
    assert_eq!(file_pattern("assets/styles/*.scss"), "assets/styles/*.scss");
}

#[test]
fn test_images_task_reencodes_png() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture_config(dir.path());
    let top = config.build.src.join("assets/images/dot.png");
    let nested = config.build.src.join("assets/images/nested/deep.png");
    fs::create_dir_all(nested.parent().unwrap()).unwrap();
    image::RgbaImage::new(2, 2).save(&top).unwrap();
    image::RgbaImage::new(2, 2).save(&nested).unwrap();

    let ctx = PageContext::from_config(&config);
    let report = images::run(&config, &ctx).unwrap();
    // the recursive glob reaches files at every depth
    assert_eq!(report.files, 2);

    // output goes straight to dist and is still a decodable png
    assert!(image::open(config.build.dist.join("assets/images/dot.png")).is_ok());
    assert!(image::open(config.build.dist.join("assets/images/nested/deep.png")).is_ok());
}

#[test]
fn test_fonts_task_copies_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture_config(dir.path());
    let input = config.build.src.join("assets/fonts/face.woff2");
    write(&input, "not-really-a-font");

    let ctx = PageContext::from_config(&config);
    fonts::run(&config, &ctx).unwrap();

    let output = config.build.dist.join("assets/fonts/face.woff2");
    assert_eq!(fs::read(&input).unwrap(), fs::read(&output).unwrap());
}

#[test]
fn test_extra_task_copies_public_tree() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture_config(dir.path());
    write(&config.build.public.join("robots.txt"), "User-agent: *\n");
    write(&config.build.public.join("icons/favicon.ico"), "ico");

    let ctx = PageContext::from_config(&config);
    let report = extra::run(&config, &ctx).unwrap();
    assert_eq!(report.files, 2);
    assert_eq!(
        fs::read_to_string(config.build.dist.join("robots.txt")).unwrap(),
        "User-agent: *\n"
    );
    assert!(config.build.dist.join("icons/favicon.ico").is_file());
}

#[test]
fn test_missing_source_root_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = fixture_config(dir.path());
    config.build.src = dir.path().join("does-not-exist");

    let ctx = PageContext::from_config(&config);
    assert!(styles::run(&config, &ctx).is_err());
}

// ============================================================================
// Production pipeline scenarios
// ============================================================================

#[test]
fn test_production_build_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture_config(dir.path());

    write(
        &config.build.src.join("assets/styles/a.scss"),
        "body { margin: 0; }\n",
    );
    write(
        &config.build.src.join("assets/scripts/b.js"),
        "const msg = () => 'ready';\nconsole.log(msg());\n",
    );
    write(
        &config.build.src.join("index.html"),
        concat!(
            "<html><head>\n",
            "<!-- build:css assets/styles/a.css -->\n",
            "<link rel=\"stylesheet\" href=\"assets/styles/a.css\">\n",
            "<!-- endbuild -->\n",
            "</head><body>\n",
            "<!-- build:js assets/scripts/b.js -->\n",
            "<script src=\"assets/scripts/b.js\"></script>\n",
            "<!-- endbuild -->\n",
            "</body></html>\n",
        ),
    );
    write(&config.build.public.join("robots.txt"), "User-agent: *\n");

    let ctx = PageContext::from_config(&config);
    pipeline::production().run(&config, &ctx).unwrap();

    let dist = &config.build.dist;

    // stylesheet bundle, minified
    let css = fs::read_to_string(dist.join("assets/styles/a.css")).unwrap();
    assert!(css.contains("margin:0"));

    // script bundle, minified
    let js = fs::read_to_string(dist.join("assets/scripts/b.js")).unwrap();
    assert!(js.contains("ready"));

    // page minified, blocks resolved
    let html = fs::read_to_string(dist.join("index.html")).unwrap();
    assert!(!html.contains("build:"));
    assert!(!html.contains("\n  "));

    // public file byte-identical
    assert_eq!(
        fs::read(config.build.public.join("robots.txt")).unwrap(),
        fs::read(dist.join("robots.txt")).unwrap()
    );
}

#[test]
fn test_production_build_one_output_per_input() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture_config(dir.path());

    write(&config.build.src.join("assets/styles/a.scss"), "b { x: y; }");
    write(&config.build.src.join("assets/styles/c.scss"), "i { x: y; }");
    write(&config.build.src.join("assets/scripts/a.js"), "var a = 1;");
    write(&config.build.src.join("index.html"), "<p>hi</p>");
    write(&config.build.src.join("about.html"), "<p>about</p>");
    write(&config.build.public.join("robots.txt"), "ok");

    let ctx = PageContext::from_config(&config);
    pipeline::production().run(&config, &ctx).unwrap();

    // path-preserving 1:1 outputs
    assert!(config.build.temp.join("assets/styles/a.css").is_file());
    assert!(config.build.temp.join("assets/styles/c.css").is_file());
    assert!(config.build.temp.join("assets/scripts/a.js").is_file());
    assert!(config.build.dist.join("index.html").is_file());
    assert!(config.build.dist.join("about.html").is_file());
    assert!(config.build.dist.join("robots.txt").is_file());
}

#[test]
fn test_production_build_fails_on_malformed_stylesheet() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture_config(dir.path());
    write(
        &config.build.src.join("assets/styles/broken.scss"),
        "body { color: ",
    );

    let ctx = PageContext::from_config(&config);
    assert!(pipeline::production().run(&config, &ctx).is_err());
    // nothing else qualified, so no dist tree was produced
    assert!(!config.build.dist.exists());
}
