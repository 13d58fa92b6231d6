//! Engine seam - whatever actually executes tests

use crate::config::RunContext;
use crate::testing::reporter::Reporter;
use anyhow::Result;
use testrig_config::Config;

/// Executes the tests selected by a configuration.
///
/// An engine reports every outcome to `reporter` in execution order and
/// never calls [`Reporter::end_suite`]; the runner does that once the engine
/// returns. Individual test failures are outcomes, not errors.
pub trait Engine {
    fn run(&mut self, config: &Config, ctx: &RunContext, reporter: &mut dyn Reporter) -> Result<()>;
}
