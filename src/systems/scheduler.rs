//! Scheduler - frame pacing for the animation loop
//!
//! `FrameScheduler` decides whether a display-refresh callback renders.
//! `ScrollThrottle` lowers the rate while the page is being wheel-scrolled.

/// Run state plus an optional frame-rate cap (0 = every callback)
#[derive(Clone, Debug)]
pub struct FrameScheduler {
    running: bool,
    host_started: bool,
    visible: bool,
    target_fps: u32,
    last_render_ms: Option<f64>,
    render_next: bool,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self {
            running: false,
            host_started: false,
            visible: true,
            target_fps: 0,
            last_render_ms: None,
            render_next: false,
        }
    }
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent; has no visible effect while the document is hidden
    pub fn start(&mut self) {
        self.host_started = true;
        self.running = self.visible;
    }

    pub fn pause(&mut self) {
        self.host_started = false;
        self.running = false;
    }

    /// Hidden documents stop the loop; becoming visible resumes it only if
    /// the host had started it
    pub fn set_visibility(&mut self, visible: bool) {
        self.visible = visible;
        self.running = visible && self.host_started;
    }

    /// Change the cap; the next callback renders regardless of the interval
    pub fn set_throttle(&mut self, fps: u32) {
        self.target_fps = fps;
        self.render_next = true;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    pub fn should_render(&self, now_ms: f64) -> bool {
        if !self.running {
            return false;
        }
        if self.target_fps == 0 || self.render_next {
            return true;
        }
        match self.last_render_ms {
            None => true,
            Some(last) => now_ms - last >= 1000.0 / self.target_fps as f64,
        }
    }

    pub fn mark_rendered(&mut self, now_ms: f64) {
        self.last_render_ms = Some(now_ms);
        self.render_next = false;
    }
}

/// Wheel-burst detector. Emits a throttle change at the start of a burst
/// and a single reset once the wheel has been quiet for `idle_ms`.
#[derive(Clone, Debug)]
pub struct ScrollThrottle {
    fps: u32,
    idle_ms: f64,
    throttled: bool,
    last_wheel_ms: f64,
}

impl ScrollThrottle {
    pub fn new(fps: u32, idle_ms: f64) -> Self {
        Self { fps, idle_ms, throttled: false, last_wheel_ms: 0.0 }
    }

    #[inline]
    pub fn is_throttled(&self) -> bool {
        self.throttled
    }

    /// Returns the rate to apply, only on the first wheel of a burst
    pub fn on_wheel(&mut self, now_ms: f64) -> Option<u32> {
        self.last_wheel_ms = now_ms;
        if self.throttled {
            return None;
        }
        self.throttled = true;
        Some(self.fps)
    }

    /// Returns `Some(0)` exactly once after the burst goes quiet
    pub fn poll(&mut self, now_ms: f64) -> Option<u32> {
        if self.throttled && now_ms - self.last_wheel_ms >= self.idle_ms {
            self.throttled = false;
            return Some(0);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_until_started() {
        let mut s = FrameScheduler::new();
        assert!(!s.should_render(0.0));
        s.start();
        s.start();
        assert!(s.should_render(0.0));
        s.pause();
        assert!(!s.is_running());
    }

    #[test]
    fn uncapped_renders_every_callback() {
        let mut s = FrameScheduler::new();
        s.start();
        for i in 0..10 {
            let now = i as f64 * 1.0;
            assert!(s.should_render(now));
            s.mark_rendered(now);
        }
    }

    #[test]
    fn throttle_respects_interval() {
        let mut s = FrameScheduler::new();
        s.start();
        s.mark_rendered(0.0);
        s.set_throttle(18);
        // immediately after a throttle change
        assert!(s.should_render(1.0));
        s.mark_rendered(1.0);
        assert!(!s.should_render(30.0));
        assert!(s.should_render(1.0 + 1000.0 / 18.0));
    }

    #[test]
    fn visibility_only_resumes_host_started_loops() {
        let mut s = FrameScheduler::new();
        s.set_visibility(false);
        s.set_visibility(true);
        assert!(!s.is_running());

        s.start();
        s.set_visibility(false);
        assert!(!s.is_running());
        s.set_visibility(true);
        assert!(s.is_running());

        s.pause();
        s.set_visibility(true);
        assert!(!s.is_running());
    }

    #[test]
    fn start_while_hidden_waits_for_visibility() {
        let mut s = FrameScheduler::new();
        s.set_visibility(false);
        s.start();
        assert!(!s.is_running());
        s.set_visibility(true);
        assert!(s.is_running());
    }

    #[test]
    fn scroll_burst_throttles_once_and_resets_once() {
        let mut t = ScrollThrottle::new(18, 100.0);
        assert_eq!(t.on_wheel(0.0), Some(18));
        assert_eq!(t.on_wheel(30.0), None);
        assert_eq!(t.on_wheel(60.0), None);
        assert_eq!(t.poll(120.0), None);
        assert_eq!(t.poll(160.0), Some(0));
        assert_eq!(t.poll(500.0), None);
        assert!(!t.is_throttled());
        assert_eq!(t.on_wheel(600.0), Some(18));
    }
}
