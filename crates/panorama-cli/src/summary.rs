use std::path::PathBuf;

use console::Style;
use panorama_core::io::OutputArtifact;
use panorama_core::pipeline::config::PanoramaConfig;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_stitch_summary(config: &PanoramaConfig, inputs: &[PathBuf]) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Panorama 360"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(12)));
    println!();

    println!("  {}", s.header.apply_to("Inputs"));
    for (i, path) in inputs.iter().enumerate() {
        println!(
            "    {:<4}{}",
            s.label.apply_to(i + 1),
            s.path.apply_to(path.display())
        );
    }
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Output dir"),
        s.path.apply_to(config.output_dir.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Work width"),
        s.value.apply_to(format!("{} px", config.preprocess.working_width))
    );
    let strategies: Vec<String> = config
        .stitching
        .strategies
        .iter()
        .map(|st| st.to_string())
        .collect();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Strategies"),
        s.method.apply_to(strategies.join(" \u{2192} "))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Confidence"),
        s.value.apply_to(format!("{:.2}", config.stitching.confidence_threshold))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("JPEG quality"),
        s.value.apply_to(config.output.jpeg_quality)
    );
    println!();
}

pub fn print_artifact(artifact: &OutputArtifact) {
    let s = Styles::new();

    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Saved"),
        s.path.apply_to(artifact.path.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Dimensions"),
        s.value.apply_to(format!("{}x{}", artifact.width, artifact.height))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Format"),
        s.method.apply_to(&artifact.format)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Size"),
        s.value.apply_to(format!("{:.1} KiB", artifact.byte_size as f64 / 1024.0))
    );
}
