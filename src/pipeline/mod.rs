//! Task composition.
//!
//! A `Pipeline` owns no data, only sequencing: `Series` runs children in
//! order, `Parallel` fans out via rayon and joins. Failure is fail-fast at
//! the composition level: a series stops at the first error, a parallel group
//! lets already-started siblings finish but reports failure if any member
//! failed. Nothing is retried.

use anyhow::Result;
use rayon::prelude::*;
use std::time::Instant;

use crate::bundle;
use crate::config::BuildConfig;
use crate::context::PageContext;
use crate::log;
use crate::task::{self, Category, Task};

/// Series/parallel composition of tasks.
pub enum Pipeline {
    Step(Task),
    Series(Vec<Pipeline>),
    Parallel(Vec<Pipeline>),
}

impl Pipeline {
    pub fn run(&self, config: &BuildConfig, ctx: &PageContext) -> Result<()> {
        match self {
            Pipeline::Step(step) => step.execute(config, ctx),
            Pipeline::Series(items) => {
                for item in items {
                    item.run(config, ctx)?;
                }
                Ok(())
            }
            Pipeline::Parallel(items) => {
                let results: Vec<Result<()>> =
                    items.par_iter().map(|item| item.run(config, ctx)).collect();

                let mut first_error = None;
                for result in results {
                    if let Err(e) = result {
                        if first_error.is_none() {
                            first_error = Some(e);
                        } else {
                            log!("error"; "{e:#}");
                        }
                    }
                }
                match first_error {
                    Some(e) => Err(e),
                    None => Ok(()),
                }
            }
        }
    }
}

/// All six category transforms with no ordering dependency among themselves.
pub fn compile_group() -> Pipeline {
    Pipeline::Parallel(
        Category::ALL
            .iter()
            .map(|c| Pipeline::Step(c.task()))
            .collect(),
    )
}

/// Production pipeline: clean, compile everything, bundle.
pub fn production() -> Pipeline {
    Pipeline::Series(vec![
        Pipeline::Step(task::clean::TASK),
        compile_group(),
        Pipeline::Step(bundle::TASK),
    ])
}

/// Development pipeline: the compile group without clean, so repeated dev
/// cycles avoid full directory deletion.
pub fn development() -> Pipeline {
    Pipeline::Series(vec![compile_group()])
}

/// Run the production build end to end.
pub fn run_production(config: &BuildConfig) -> Result<()> {
    let ctx = PageContext::from_config(config);
    let started = Instant::now();
    production().run(config, &ctx)?;
    log!("build"; "finished in {:.1?}", started.elapsed());
    Ok(())
}
