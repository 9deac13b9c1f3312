pub(crate) mod attr;

use crate::config::Priv;

/// Per-sibling configuration passed to [`CounterGroup::add`][crate::count::group::CounterGroup::add].
///
/// Siblings inherit the group leader's target and enable state; only the
/// privilege exclusion mask is configurable per sibling.
#[derive(Clone, Debug, Default)]
pub struct Opts {
    /// Privilege levels to exclude from the count.
    pub exclude: Priv,
}
