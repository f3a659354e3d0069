/// Configuration for [`crate::Reconciler`].
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`; missing fields fall
/// back to [`WindowOptions::default`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct WindowOptions {
    /// Distance beyond each edge of the visible span within which cells stay materialized.
    pub margin: u32,

    /// Average item extent assumed before any cell has been measured (and while every windowed
    /// cell measures zero).
    pub default_item_extent: u32,

    /// Upper bound on cells materialized by a single pass. Growth resumes on the next pass.
    pub max_cells_per_pass: usize,

    /// When the window reaches item 0, shift all placed cells so item 0 starts at offset 0 and
    /// ask the host to scroll by the same amount.
    ///
    /// Anchor-based placement accumulates estimate error; without pinning, item 0 can end up at
    /// a negative (unreachable) or positive (blank space above) offset.
    pub pin_leading_edge: bool,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            margin: 0,
            default_item_extent: 30,
            max_cells_per_pass: 4096,
            pin_leading_edge: true,
        }
    }
}

impl WindowOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_default_item_extent(mut self, extent: u32) -> Self {
        self.default_item_extent = extent;
        self
    }

    /// Sets the per-pass materialization budget. Values below 1 are raised to 1.
    pub fn with_max_cells_per_pass(mut self, max: usize) -> Self {
        self.max_cells_per_pass = max.max(1);
        self
    }

    pub fn with_pin_leading_edge(mut self, pin: bool) -> Self {
        self.pin_leading_edge = pin;
        self
    }
}
