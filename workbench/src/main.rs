use anyhow::Context;
use antcore::field::{Channel, DisplayMode, WireDrawMode};
use antcore::prelude::AntennaMode;
use antcore::scene::StandardAntenna;
use clap::{Parser, ValueEnum};
use report::model::VisualizationModel;
use report::publish::ReportPublisher;
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod report;
mod workflow;

#[derive(Clone, Copy, ValueEnum)]
enum DisplayArg {
    Points,
    Surface,
    Sphere,
}

impl From<DisplayArg> for DisplayMode {
    fn from(arg: DisplayArg) -> Self {
        match arg {
            DisplayArg::Points => DisplayMode::Points,
            DisplayArg::Surface => DisplayMode::Surface,
            DisplayArg::Sphere => DisplayMode::Sphere,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ChannelArg {
    Gain,
    Sense,
    Tilt,
    AxialRatio,
    Nulls,
}

impl From<ChannelArg> for Channel {
    fn from(arg: ChannelArg) -> Self {
        match arg {
            ChannelArg::Gain => Channel::Gain,
            ChannelArg::Sense => Channel::PolarizationSense,
            ChannelArg::Tilt => Channel::PolarizationTilt,
            ChannelArg::AxialRatio => Channel::AxialRatio,
            ChannelArg::Nulls => Channel::Nulls,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum WireArg {
    Geometry,
    Magnitude,
    Phase,
}

impl From<WireArg> for WireDrawMode {
    fn from(arg: WireArg) -> Self {
        match arg {
            WireArg::Geometry => WireDrawMode::Geometry,
            WireArg::Magnitude => WireDrawMode::CurrentMagnitude,
            WireArg::Phase => WireDrawMode::CurrentPhase,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about = "Antenna geometry, solve and field mesh driver")]
struct Args {
    /// Load a workflow config from YAML; other flags override it
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Solver description files to load
    antennas: Vec<PathBuf>,
    /// Built-in antenna to load (dipole or yagi)
    #[arg(long)]
    standard: Vec<String>,
    /// Degrees between pattern samples
    #[arg(long)]
    step: Option<f64>,
    /// Solve every antenna together
    #[arg(long, default_value_t = false)]
    multiple: bool,
    /// Use the built-in synthetic solver instead of the external one
    #[arg(long, default_value_t = false)]
    synthetic: bool,
    /// External solver executable
    #[arg(long)]
    solver: Option<String>,
    #[arg(long, value_enum)]
    display: Option<DisplayArg>,
    #[arg(long, value_enum)]
    channel: Option<ChannelArg>,
    #[arg(long, value_enum)]
    wires: Option<WireArg>,
    /// Command script replayed after loading
    #[arg(long)]
    script: Option<PathBuf>,
    /// Write a JSON report here
    #[arg(long)]
    report: Option<PathBuf>,
    /// Write the final scene as a solver description here
    #[arg(long)]
    save: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> anyhow::Result<WorkflowConfig> {
        let mut config = match &self.workflow {
            Some(path) => WorkflowConfig::load(path)?,
            None => WorkflowConfig::from_args(Vec::new(), self.synthetic),
        };

        config.antennas.extend(self.antennas);
        for name in &self.standard {
            let standard = StandardAntenna::from_name(name)
                .with_context(|| format!("unknown standard antenna {:?}", name))?;
            config.standard.push(standard);
        }
        if let Some(step) = self.step {
            config.visual.step_size = step;
        }
        if self.multiple {
            config.mode = AntennaMode::Multiple;
        }
        if self.synthetic {
            config.synthetic = true;
        }
        if let Some(executable) = self.solver {
            config.solver.executable = executable;
        }
        if let Some(display) = self.display {
            config.display = display.into();
        }
        if let Some(channel) = self.channel {
            config.channel = channel.into();
        }
        if let Some(wires) = self.wires {
            config.wire_mode = wires.into();
        }
        if self.script.is_some() {
            config.script = self.script;
        }
        if self.report.is_some() {
            config.report = self.report;
        }
        if self.save.is_some() {
            config.save = self.save;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = args.into_config()?;

    if config.initial_antennas() == 0 && config.script.is_none() {
        anyhow::bail!("nothing to load: pass antenna files, --standard or --script");
    }

    let runner = Runner::new(config.clone());
    let publisher = ReportPublisher::new(config.report.clone());
    let result = runner.execute()?;

    for message in &result.messages {
        publisher.publish_status(&message.text);
    }
    for summary in &result.solves {
        println!(
            "Solve -> antenna {}, samples {}, segments {}, anomalies {}",
            summary.antenna, summary.samples, summary.segments, summary.anomalies
        );
    }

    let cfg = runner.config();
    let model = VisualizationModel::from_result(&result, cfg.display, cfg.channel, cfg.wire_mode);
    publisher.publish(&model)?;
    if let Some(path) = &cfg.report {
        publisher.publish_status(&format!("report written to {}", path.display()));
    }

    Ok(())
}
