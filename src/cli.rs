use std::path::PathBuf;

#[derive(clap::Parser, Debug)]
#[clap(version, about = "Interactive viewer for baked 2D map geometry")]
pub struct Cli {
    /// Directory containing the map_*.dat files.
    #[clap(long)]
    pub data_dir: Option<PathBuf>,

    /// Read viewer settings from the given TOML file.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Also write logs to the given file.
    #[clap(long)]
    pub log: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `postal_map=trace`. Overrides RUST_LOG.
    #[clap(long)]
    pub log_level: Option<String>,

    /// Serve puffin profiling data on the default puffin_http port.
    #[clap(long)]
    pub profile: bool,
}
