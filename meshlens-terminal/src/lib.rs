/// Terminal front end: prints mesh statistics, converts between formats and
/// traces scripted transforms as plain text.
use anyhow::{Context, Result};
use log::{error, info};
use meshlens_core::{
    analyze, load_mesh, report::comparison_json, save_mesh, AnimationSettings,
    BasicTransformations, Config, Mesh, MeshFormat, MeshReport, Transform, TransformController,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub mod panel;

pub use panel::{comparison_table, draw_info_panel};

/// Print the info panel (or the JSON report) of each file
pub fn run_info<W: Write>(out: &mut W, files: &[PathBuf], weld: bool, json: bool) -> Result<()> {
    for path in files {
        let format = MeshFormat::from_path(path)?;
        let mesh = load_mesh(path).with_context(|| format!("failed to load {}", path.display()))?;
        let mesh = if weld { mesh.welded() } else { mesh };

        if json {
            let report = MeshReport::from_mesh(format, &mesh)
                .with_context(|| format!("malformed mesh in {}", path.display()))?;
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        } else {
            let stats = analyze(&mesh).with_context(|| format!("malformed mesh in {}", path.display()))?;
            draw_info_panel(out, &path.display().to_string(), format, &stats, mesh.is_indexed())?;
        }
    }
    Ok(())
}

/// Options of the `convert` command
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub input: PathBuf,
    /// Falls back to the configured output directory
    pub out_dir: Option<PathBuf>,
    pub weld: bool,
    pub center: bool,
    pub position_x: Option<f32>,
    pub rotation_y: Option<f32>,
    pub scale: Option<f32>,
}

impl ConvertOptions {
    fn has_slider_values(&self) -> bool {
        self.position_x.is_some() || self.rotation_y.is_some() || self.scale.is_some()
    }
}

/// Apply the slider values from the command line to an identity transform
pub fn slider_transform(options: &ConvertOptions, config: &Config) -> Transform {
    let mut transform = Transform::identity();
    let mut controller = TransformController::from_transform(config.sliders, &transform);
    if let Some(x) = options.position_x {
        controller.set_position_x(x);
    }
    if let Some(degrees) = options.rotation_y {
        controller.set_rotation_y(degrees);
    }
    if let Some(scale) = options.scale {
        controller.set_scale(scale);
    }
    controller.apply(&mut transform);
    transform
}

/// Write the model in every other format, reload each copy and compare them.
///
/// Returns the reports in the order they were produced, source first. A
/// failing target format is reported and skipped.
pub fn run_convert<W: Write>(out: &mut W, options: &ConvertOptions, config: &Config) -> Result<Vec<MeshReport>> {
    let input = &options.input;
    let source_format = MeshFormat::from_path(input)?;
    let mut mesh = load_mesh(input).with_context(|| format!("failed to load {}", input.display()))?;

    if options.weld {
        mesh = mesh.welded();
    }
    if options.center {
        mesh = mesh.centered();
    }
    if options.has_slider_values() {
        let transform = slider_transform(options, config);
        info!("baking transform {:?}", transform);
        mesh = mesh.transformed(&transform.matrix());
    }

    let mut reports = vec![MeshReport::from_mesh(source_format, &mesh)
        .with_context(|| format!("malformed mesh in {}", input.display()))?];

    let out_dir = options.out_dir.clone().unwrap_or_else(|| config.output.dir.clone());
    fs::create_dir_all(&out_dir).with_context(|| format!("failed to create {}", out_dir.display()))?;
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("mesh")
        .to_string();

    for format in MeshFormat::ALL.into_iter().filter(|&f| f != source_format) {
        let target = out_dir.join(format!("{stem}.{}", format.extension()));
        match convert_one(&mesh, format, &target) {
            Ok(report) => {
                writeln!(out, "[OK] Converted to {}: {}", format, target.display())?;
                reports.push(report);
            }
            Err(e) => {
                error!("conversion to {format} failed: {e:#}");
                writeln!(out, "[ERROR] Error converting to {format}: {e:#}")?;
            }
        }
    }

    let stats_file = out_dir.join(format!("{stem}_comparison.json"));
    fs::write(&stats_file, comparison_json(&reports)?)
        .with_context(|| format!("failed to write {}", stats_file.display()))?;
    writeln!(out, "Comparison stats saved to: {}", stats_file.display())?;
    write!(out, "{}", comparison_table(&reports))?;

    Ok(reports)
}

fn convert_one(mesh: &Mesh, format: MeshFormat, target: &Path) -> Result<MeshReport> {
    save_mesh(mesh, target)?;
    let reloaded = load_mesh(target)?;
    Ok(MeshReport::from_mesh(format, &reloaded)?)
}

/// Run the scripted transform for a fixed number of frames and print each one
pub fn run_animate<W: Write>(
    out: &mut W,
    settings: AnimationSettings,
    frames: u32,
    dt: f32,
    seed: u64,
) -> Result<Vec<Transform>> {
    anyhow::ensure!(dt > 0.0, "frame step must be positive, got {dt}");
    settings.validate()?;

    let mut transform = Transform::identity();
    let mut script = BasicTransformations::new(settings, &transform);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut trace = Vec::with_capacity(frames as usize);

    writeln!(out, "{:>6} {:>8} {:>26} {:>22} {:>7}", "frame", "time", "position", "rotation", "scale")?;
    for frame in 1..=frames {
        let time = frame as f32 * dt;
        script.update(&mut transform, dt, time, &mut rng);

        let p = transform.translation;
        let r = transform.rotation.degrees();
        writeln!(
            out,
            "{frame:>6} {time:>8.3} ({:>7.3}, {:>7.3}, {:>7.3}) ({:>6.1}, {:>5.1}, {:>5.1}) {:>7.3}",
            p.x, p.y, p.z, r.x, r.y, r.z, transform.scale.x
        )?;
        trace.push(transform);
    }

    Ok(trace)
}
