//! Text rendering of the stats overlay and the permission screen.
//!
//! The overlay has three equal columns (`Shots`, `Makes`, `Percentage`), each
//! showing its value centred above its label:
//!
//! ```text
//!      5           2          40%
//!    Shots       Makes     Percentage
//! ```

use shot_core::ShotStats;

use super::{ScreenDto, StatsDto};

const COLUMN_WIDTH: usize = 12;

/// Renders the three stat columns as two lines: values, then labels.
pub fn render_overlay(stats: &ShotStats) -> String {
    render_columns(&StatsDto::from(*stats))
}

/// Renders whatever `screen` asks for.
pub fn render_screen(screen: &ScreenDto) -> String {
    match screen {
        ScreenDto::PermissionRequired {
            message,
            action_label,
        } => format!("{message}\n[ {action_label} ]"),
        ScreenDto::Preview {
            camera_active,
            stats,
        } => {
            let overlay = render_columns(stats);
            if *camera_active {
                overlay
            } else {
                format!("(no camera preview)\n{overlay}")
            }
        }
    }
}

fn render_columns(stats: &StatsDto) -> String {
    let percentage = format!("{}%", stats.percentage);
    let values = [stats.shots.to_string(), stats.makes.to_string(), percentage];
    let labels = ["Shots", "Makes", "Percentage"];

    let mut top = String::new();
    let mut bottom = String::new();
    for (value, label) in values.iter().zip(labels) {
        top.push_str(&format!("{value:^COLUMN_WIDTH$}"));
        bottom.push_str(&format!("{label:^COLUMN_WIDTH$}"));
    }
    format!("{}\n{}", top.trim_end(), bottom.trim_end())
}
