use anikii::{Config, run};
use tokio::runtime::Builder;

fn main() -> anyhow::Result<()> {
    // the runtime is sized from the config, so it is read before tracing exists
    let config = Config::load()?;

    let mut runtime = Builder::new_multi_thread();
    runtime.enable_all();
    if let threads @ 1.. = config.general.worker_threads {
        runtime.worker_threads(threads);
    }

    runtime.build()?.block_on(run(config))
}
