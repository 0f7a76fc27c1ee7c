use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use plume_core::SiteBuilder;

use crate::config::load_build_config;

pub fn make_subcommand() -> Command {
    Command::new("build")
        .about("Build the site from markdown content")
        .arg(
            Arg::new("source")
                .short('s')
                .long("source")
                .value_name("DIR")
                .help("Source directory containing markdown files [default: ./source]"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory for generated site [default: ./public]"),
        )
        .arg(
            Arg::new("theme")
                .short('t')
                .long("theme")
                .value_name("DIR")
                .help("Theme directory [default: ./theme]"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file [default: ./plume.toml]"),
        )
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    // Load cascading configuration
    let plume_config = load_build_config(args)?;
    let build = plume_config.build_config();
    let core = plume_config.site_config();

    let site = SiteBuilder::new()
        .source_dir(&build.source)
        .output_dir(&build.output)
        .theme_dir(&build.theme)
        .site_config(core.site.clone().unwrap_or_default())
        .dirs_config(core.dirs.clone().unwrap_or_default())
        .build()?;

    site.render_all()?;

    println!("Site built successfully in {}", build.output);

    Ok(())
}
