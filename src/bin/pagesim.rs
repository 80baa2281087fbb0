use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use log::info;
use pagesim::config::Config;
use pagesim::engine::Engine;
use pagesim::error::Result;
use pagesim::{config_err, internal_err};
use pagesim::report;
use pagesim::trace::{self, Trace};

fn main() -> Result<()> {
    let args = clap::command!()
        .about("Page replacement simulator")
        .arg(
            clap::Arg::new("algorithm")
                .help("Replacement algorithm: 0=FIFO, 1=LRU, 2=MIN, 3=SECOND CHANCE, 4=CLOCK"),
        )
        .arg(clap::Arg::new("bits").help("Physical address bits: 20 or 24"))
        .arg(
            clap::Arg::new("config")
                .short('c')
                .long("config")
                .help("Configuration file path for the simulator")
                .default_value("config/pagesim.yaml"),
        )
        .arg(clap::Arg::new("trace").short('t').long("trace").help("Text trace file to replay"))
        .arg(
            clap::Arg::new("pid")
                .short('p')
                .long("pid")
                .help("Sample the trace from the memory mappings of this process"),
        )
        .arg(clap::Arg::new("plot").long("plot").help("Write the page-over-time plot data here"))
        .arg(
            clap::Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Do not print every step")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let mut cfg = Config::new(args.get_one::<String>("config").unwrap().as_ref())?;
    if let Some(algorithm) = args.get_one::<String>("algorithm") {
        cfg.policy = algorithm.parse()?;
    }
    if let Some(bits) = args.get_one::<String>("bits") {
        cfg.memory = bits.parse::<u32>()?.try_into()?;
    }
    if let Some(file) = args.get_one::<String>("trace") {
        cfg.trace_file = file.clone();
    }
    if let Some(file) = args.get_one::<String>("plot") {
        cfg.plot_file = file.clone();
    }
    if *args.get_one::<bool>("quiet").unwrap() {
        cfg.steps = false;
    }

    let loglevel = cfg.log_level.parse::<simplelog::LevelFilter>()?;
    let mut logconfig = simplelog::ConfigBuilder::new();
    simplelog::SimpleLogger::init(loglevel, logconfig.build())?;

    let trace = if !cfg.trace_file.is_empty() {
        Trace::from_reader(BufReader::new(File::open(&cfg.trace_file)?))?
    } else if let Some(pid) = args.get_one::<String>("pid") {
        let maps = File::open(format!("/proc/{}/maps", pid))?;
        trace::sample_maps(BufReader::new(maps), &mut rand::thread_rng())?
    } else {
        return Err(config_err!("no trace source, pass --trace or --pid"));
    };
    println!("Trace size: {}", trace.len());

    // aggregate pass
    let summary = Engine::with_memory(cfg.policy, cfg.memory, &trace)?.run()?;
    println!("{}", summary);

    if !cfg.plot_file.is_empty() {
        let mut w = BufWriter::new(File::create(&cfg.plot_file)?);
        report::write_plot(&trace, &mut w)?;
        w.flush()?;
        info!("plot data written to {}", cfg.plot_file);
    }

    // step-instrumented pass, on a fresh engine
    let mut engine = Engine::with_memory(cfg.policy, cfg.memory, &trace)?;
    let mut steps = vec![];
    for step in engine.steps() {
        let step = step?;
        if cfg.steps {
            println!("{}", step);
        }
        steps.push(step);
    }
    if !cfg.steps_file.is_empty() {
        let mut w = BufWriter::new(File::create(&cfg.steps_file)?);
        report::write_steps(&steps, &mut w)?;
        w.flush()?;
        info!("step results written to {}", cfg.steps_file);
    }

    if engine.summary() != summary {
        return Err(internal_err!(
            "step pass diverged from aggregate pass: {:?} != {:?}",
            engine.summary(),
            summary
        ));
    }
    Ok(())
}
