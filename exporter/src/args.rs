use crate::{export, write_documents, RoleManifest};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use role_exporter_kube::ExportSettings;
use std::{fs, io, path::PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[clap(
    name = "role-exporter",
    about = "Exports role manifests as Kubernetes documents",
    version
)]
pub struct Args {
    #[clap(
        long,
        default_value = "role_exporter=info,warn",
        env = "ROLE_EXPORTER_LOG"
    )]
    log_level: String,

    #[clap(long, value_enum, default_value = "plain")]
    log_format: LogFormat,

    /// The role manifest to export.
    #[clap(long, short = 'm')]
    manifest: PathBuf,

    /// Emits templated documents, sized at render time, instead of static ones.
    #[clap(long)]
    helm: bool,

    /// Writes one file per role into this directory instead of writing to stdout.
    #[clap(long, short = 'o')]
    output_dir: Option<PathBuf>,

    #[clap(long, default_value = "docker.io", env = "ROLE_EXPORTER_REGISTRY")]
    registry: String,

    #[clap(long, default_value = "library")]
    organization: String,

    #[clap(long, default_value = "latest")]
    tag: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Plain,
    Json,
}

// === impl Args ===

impl Args {
    pub fn run(self) -> Result<()> {
        let Self {
            log_level,
            log_format,
            manifest,
            helm,
            output_dir,
            registry,
            organization,
            tag,
        } = self;

        init_tracing(&log_level, log_format)?;

        let settings = ExportSettings {
            create_helm_chart: helm,
            registry,
            organization,
            tag,
        };
        let manifest = RoleManifest::load(&manifest)?;
        let exported = export(&manifest, &settings)?;

        match output_dir {
            None => write_documents(&exported, io::stdout().lock())?,
            Some(dir) => {
                fs::create_dir_all(&dir)
                    .with_context(|| format!("failed to create {}", dir.display()))?;
                for docs in &exported {
                    let path = dir.join(format!("{}.yaml", docs.role));
                    let file = fs::File::create(&path)
                        .with_context(|| format!("failed to create {}", path.display()))?;
                    write_documents(std::slice::from_ref(docs), io::BufWriter::new(file))?;
                    info!(path = %path.display(), "wrote role");
                }
            }
        }

        Ok(())
    }
}

fn init_tracing(level: &str, format: LogFormat) -> Result<()> {
    let filter =
        EnvFilter::try_new(level).with_context(|| format!("invalid log level {:?}", level))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    match format {
        LogFormat::Plain => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|error| anyhow!(error))
}
