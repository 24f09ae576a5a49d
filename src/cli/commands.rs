use clap::Subcommand;

use super::fill::FillArgs;
use super::inspect::InspectArgs;
use super::learn::LearnArgs;
use super::patterns::PatternsArgs;
use super::profile::ProfileArgs;

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Learn a pattern from a page snapshot someone has filled in
    Learn(LearnArgs),

    /// Fill a page snapshot from the stored profile
    Fill(FillArgs),

    /// List a page's data controls with their labels and locator hints
    Inspect(InspectArgs),

    /// Manage stored patterns
    Patterns(PatternsArgs),

    /// Show or replace the stored profile
    Profile(ProfileArgs),
}
