/// Picks the nav entry for the section currently under the header.
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollSpy {
    offset: f64,
    sections: Vec<(String, f64)>,
}

impl ScrollSpy {
    /// `offset` is the height of the fixed header in pixels.
    pub fn new(offset: f64) -> Self {
        Self {
            offset,
            sections: Vec::new(),
        }
    }

    pub fn set_section(&mut self, id: &str, top: f64) {
        match self.sections.iter_mut().find(|(known, _)| known == id) {
            Some(entry) => entry.1 = top,
            None => self.sections.push((id.to_string(), top)),
        }
        self.sections.sort_by(|a, b| a.1.total_cmp(&b.1));
    }

    /// The last section whose top has passed the header line, or the first
    /// section when the page is scrolled above all of them.
    pub fn active(&self, scroll_y: f64) -> Option<&str> {
        let line = scroll_y + self.offset;
        self.sections
            .iter()
            .rev()
            .find(|(_, top)| *top <= line)
            .or_else(|| self.sections.first())
            .map(|(id, _)| id.as_str())
    }
}

pub fn scroll_progress(scroll_y: f64, document_height: f64, viewport_height: f64) -> f64 {
    let scrollable = document_height - viewport_height;
    if scrollable <= 0.0 {
        return 0.0;
    }
    (scroll_y / scrollable).clamp(0.0, 1.0)
}

/// Vertical shift for a layer moving at `speed` relative to the page.
/// Zero when motion is reduced.
pub fn parallax_offset(scroll_y: f64, speed: f64, reduced_motion: bool) -> f64 {
    if reduced_motion {
        return 0.0;
    }
    scroll_y.max(0.0) * speed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spy() -> ScrollSpy {
        let mut spy = ScrollSpy::new(72.0);
        spy.set_section("about", 900.0);
        spy.set_section("home", 0.0);
        spy.set_section("projects", 1800.0);
        spy
    }

    #[test]
    fn picks_last_section_above_header_line() {
        let spy = spy();

        assert_eq!(spy.active(0.0), Some("home"));
        assert_eq!(spy.active(827.0), Some("home"));
        assert_eq!(spy.active(828.0), Some("about"));
        assert_eq!(spy.active(5000.0), Some("projects"));
    }

    #[test]
    fn falls_back_to_first_section_above_content() {
        let mut spy = ScrollSpy::new(0.0);
        spy.set_section("hero", 200.0);

        assert_eq!(spy.active(0.0), Some("hero"));
        assert_eq!(ScrollSpy::new(0.0).active(0.0), None);
    }

    #[test]
    fn moving_a_section_keeps_order() {
        let mut spy = spy();
        spy.set_section("home", 2000.0);

        assert_eq!(spy.active(1000.0), Some("about"));
        assert_eq!(spy.active(2000.0), Some("home"));
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(scroll_progress(500.0, 2000.0, 1000.0), 0.5);
        assert_eq!(scroll_progress(-20.0, 2000.0, 1000.0), 0.0);
        assert_eq!(scroll_progress(1500.0, 2000.0, 1000.0), 1.0);
        assert_eq!(scroll_progress(100.0, 600.0, 800.0), 0.0);
    }

    #[test]
    fn parallax_respects_reduced_motion() {
        assert_eq!(parallax_offset(400.0, 0.5, false), 200.0);
        assert_eq!(parallax_offset(400.0, 0.5, true), 0.0);
        assert_eq!(parallax_offset(-10.0, 0.5, false), 0.0);
    }
}
