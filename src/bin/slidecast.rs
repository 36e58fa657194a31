use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

use slidecast::scene::{Layer, PostContent, Slide, Template};
use slidecast::{
    ContentStore as _, DirectoryFetcher, ExportMode, ExportOptions, Exporter, FontLibrary,
    MemoryStore, PostExportInput, PreloadedImages, SlideScale, SlideView,
};

#[derive(Parser, Debug)]
#[command(name = "slidecast", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a template bundle's slides to PNG files.
    Render(RenderArgs),
    /// Export a post (template bundle + resolved content) to a zip.
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input template bundle JSON ({ template, slides, layers }).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory for slide PNGs.
    #[arg(long)]
    out: PathBuf,

    /// Render scale factor (1.0 = native template resolution).
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Directory of .ttf/.otf fonts, registered by file stem.
    #[arg(long)]
    fonts: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input template bundle JSON ({ template, slides, layers }).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Resolved post content JSON.
    #[arg(long)]
    post: PathBuf,

    /// Output zip path.
    #[arg(long)]
    out: PathBuf,

    /// Which layers end up in the rendered slides.
    #[arg(long, value_enum, default_value_t = ModeChoice::WithText)]
    mode: ModeChoice,

    /// Directory of .ttf/.otf fonts, registered by file stem.
    #[arg(long)]
    fonts: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeChoice {
    WithText,
    ImagesOnly,
    FirstSlideNoText,
}

impl From<ModeChoice> for ExportMode {
    fn from(v: ModeChoice) -> Self {
        match v {
            ModeChoice::WithText => ExportMode::WithText,
            ModeChoice::ImagesOnly => ExportMode::ImagesOnly,
            ModeChoice::FirstSlideNoText => ExportMode::FirstSlideNoText,
        }
    }
}

#[derive(serde::Deserialize)]
struct TemplateBundle {
    template: Template,
    slides: Vec<Slide>,
    layers: Vec<Layer>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Export(args) => cmd_export(args),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let f = File::open(path).with_context(|| format!("open {what} '{}'", path.display()))?;
    serde_json::from_reader(BufReader::new(f)).with_context(|| format!("parse {what} JSON"))
}

fn load_fonts(dir: Option<&Path>) -> anyhow::Result<FontLibrary> {
    let mut fonts = FontLibrary::new();
    let Some(dir) = dir else {
        return Ok(fonts);
    };
    for entry in std::fs::read_dir(dir).with_context(|| format!("read fonts dir '{}'", dir.display()))? {
        let path = entry?.path();
        let is_font = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"));
        if !is_font {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let bytes =
            std::fs::read(&path).with_context(|| format!("read font '{}'", path.display()))?;
        fonts.register(stem, bytes);
    }
    Ok(fonts)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let bundle: TemplateBundle = read_json(&args.in_path, "template bundle")?;
    bundle.template.validate()?;

    let assets_root = args.in_path.parent().unwrap_or_else(|| Path::new("."));
    let fetcher = DirectoryFetcher::new(assets_root);
    let store = MemoryStore::new();
    let fonts = load_fonts(args.fonts.as_deref())?;
    let mut compositor = slidecast::Compositor::new(fonts);

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;

    for (idx, slide) in bundle.slides.iter().enumerate() {
        let background_url = slidecast::binding::resolve::resolve_background(&store, slide)?;
        let view = SlideView::with_background(background_url.clone());

        let urls = background_url.into_iter();
        let images = PreloadedImages::preload(&fetcher, urls, Default::default());

        let layers: Vec<Layer> = bundle
            .layers
            .iter()
            .filter(|l| l.slide_id == slide.id)
            .cloned()
            .collect();

        let frame = compositor.render_slide(
            &bundle.template,
            slide,
            &layers,
            &view,
            &images,
            SlideScale::Fixed(args.scale),
        )?;

        let out_path = args.out.join(format!("slide-{:02}.png", idx + 1));
        image::save_buffer_with_format(
            &out_path,
            &frame.data,
            frame.width,
            frame.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", out_path.display()))?;
        eprintln!("wrote {}", out_path.display());
    }

    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let bundle: TemplateBundle = read_json(&args.in_path, "template bundle")?;
    bundle.template.validate()?;
    let content: PostContent = read_json(&args.post, "post content")?;

    let mut store = MemoryStore::new();
    store.insert_template(
        bundle.template.clone(),
        bundle.slides.clone(),
        bundle.layers.clone(),
    )?;

    let assets_root = args.in_path.parent().unwrap_or_else(|| Path::new("."));
    let fetcher = DirectoryFetcher::new(assets_root);
    let fonts = load_fonts(args.fonts.as_deref())?;

    let input = PostExportInput {
        post_id: slidecast::scene::PostId::new(),
        title: content.title.clone(),
        caption: content.caption.clone(),
        content,
    };

    let opts = ExportOptions {
        mode: args.mode.into(),
        ..Default::default()
    };
    let mut exporter = Exporter::new(&store, &fetcher, fonts);
    let zip = exporter.export_single_post(&input, &opts)?;

    std::fs::write(&args.out, zip).with_context(|| format!("write zip '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
