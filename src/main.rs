mod cli;
mod events;
mod io;
mod logging;
mod orchestrator;
mod outside;
mod platform;
mod result;
mod select;
mod subtitles;
mod types;

use clap::Parser;
use crossbeam_channel::unbounded;
use tracing::{info, warn, Level};

use crate::{
    cli::Args,
    events::EventSink,
    orchestrator::Orchestrator,
    outside::Ytdl,
};

fn main() -> miette::Result<()> {
    let args = Args::parse();
    logging::init_logging(if args.debug { Level::DEBUG } else { Level::INFO })?;

    // Probe the provider binary before doing anything else
    let provider = Ytdl::new()?;
    let request = args.into_request();

    info!("Output directory: '{}'", request.output_dir.display());

    let (tx, rx) = unbounded();

    // The run executes on its own thread; the main thread is the log pane,
    // draining progress events until the worker hangs up the channel
    let run_result = std::thread::scope(|scope| {
        let worker = std::thread::Builder::new()
            .name("orchestrator".to_string())
            .spawn_scoped(scope, {
                let provider = &provider;
                let request = &request;
                move || {
                    let orchestrator = Orchestrator::new(provider, EventSink::new(tx));
                    orchestrator.run(request)
                }
            })
            .expect("Could not spawn the worker thread");

        for event in rx {
            if event.is_warning() {
                warn!("{event}");
            } else {
                info!("{event}");
            }
        }

        worker.join().expect("Could not join the worker thread")
    });
    run_result?;

    info!("All tasks completed");
    Ok(())
}
