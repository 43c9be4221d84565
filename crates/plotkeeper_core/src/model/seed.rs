//! Built-in catalogs used on first run, when storage holds no collection.

use crate::model::active::ActiveProcess;
use crate::model::plot::Plot;
use crate::model::process::Process;

/// Example process catalog.
pub fn default_processes() -> Vec<Process> {
    vec![
        Process::new(1, "Chicken", 60),
        Process::new(2, "Honey", 45),
        Process::new(3, "Mine", 90),
        Process::new(4, "Cow", 90),
        Process::new(5, "Sauna VIP", 60 * 8),
    ]
}

/// Example plot catalog.
pub fn default_plots() -> Vec<Plot> {
    vec![
        Plot::new(4768, "4768", "Farm (60x), Silk (4x), Chicken"),
        Plot::new(4156, "4156", "Farm (60x)"),
        Plot::new(4172, "4172", "4x Honey"),
        Plot::new(4171, "4171", "Chicken"),
        Plot::new(1309, "1309", "4x Salt Mine"),
        Plot::new(0, "Terraville", "x"),
        Plot::new(-1, "Sauna", "Sauna description"),
    ]
}

/// Nothing runs on first start.
pub fn default_active_processes() -> Vec<ActiveProcess> {
    Vec::new()
}
