use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Draw a score as a row of filled and empty cells, e.g. `■■□` for 2 of 3.
pub(crate) fn score_gauge(value: i64, max: i64) -> String {
    let max = max.max(0) as usize;
    let filled = (value.max(0) as usize).min(max);
    let mut gauge = String::with_capacity(max * 3);
    gauge.push_str(&"■".repeat(filled));
    gauge.push_str(&"□".repeat(max - filled));
    gauge
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context};

    #[test]
    fn gauge_fills_up_to_value() {
        assert_eq!(score_gauge(0, 3), "□□□");
        assert_eq!(score_gauge(2, 3), "■■□");
        assert_eq!(score_gauge(9, 3), "■■■");
        assert_eq!(score_gauge(-1, 3), "□□□");
    }

    #[test]
    fn surface_error_picks_root_cause() {
        let err = Err::<(), _>(anyhow!("expected 15 bind values, got 14"))
            .context("failed to save entry")
            .unwrap_err();
        assert_eq!(surface_error(&err), "expected 15 bind values, got 14");
    }

    #[test]
    fn centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(60, 50, area);
        assert!(popup.x >= area.x && popup.right() <= area.right());
        assert!(popup.y >= area.y && popup.bottom() <= area.bottom());
        assert!(popup.width > 0 && popup.width < area.width);
    }
}
