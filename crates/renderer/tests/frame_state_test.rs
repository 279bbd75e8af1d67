//! Frame protocol tests through the public API, driven by a scripted target
//! and window. No GPU required.

use std::collections::VecDeque;

use ash::vk;
use engine_renderer::{
    AcquireStatus, FramePhase, FrameState, FrameTarget, MAX_FRAMES_IN_FLIGHT, PresentStatus,
    RendererError, RendererResult, WindowBoundary,
};

const EXTENT: vk::Extent2D = vk::Extent2D {
    width: 800,
    height: 600,
};

/// Replays queued acquire and present results; anything not queued succeeds.
#[derive(Default)]
struct ScriptedTarget {
    acquires: VecDeque<RendererResult<AcquireStatus>>,
    presents: VecDeque<RendererResult<PresentStatus>>,
    next_image: u32,
    recorded_slots: Vec<usize>,
    submitted: Vec<(u32, usize)>,
    recreated: Vec<vk::Extent2D>,
}

impl FrameTarget for ScriptedTarget {
    fn acquire(&mut self, _frame_index: usize) -> RendererResult<AcquireStatus> {
        self.acquires.pop_front().unwrap_or_else(|| {
            let image_index = self.next_image;
            self.next_image = (self.next_image + 1) % 3;
            Ok(AcquireStatus::Ready {
                image_index,
                suboptimal: false,
            })
        })
    }

    fn begin_recording(&mut self, frame_index: usize) -> RendererResult<()> {
        self.recorded_slots.push(frame_index);
        Ok(())
    }

    fn submit(&mut self, image_index: u32, frame_index: usize) -> RendererResult<PresentStatus> {
        self.submitted.push((image_index, frame_index));
        self.presents.pop_front().unwrap_or(Ok(PresentStatus::Presented))
    }

    fn recreate(&mut self, extent: vk::Extent2D) -> RendererResult<()> {
        self.recreated.push(extent);
        Ok(())
    }
}

/// Window whose extent changes to the next queued value on each event wait.
struct TestWindow {
    extent: vk::Extent2D,
    pending_extents: VecDeque<vk::Extent2D>,
    resized: bool,
    closed: bool,
    event_waits: usize,
}

impl TestWindow {
    fn new(extent: vk::Extent2D) -> Self {
        Self {
            extent,
            pending_extents: VecDeque::new(),
            resized: false,
            closed: false,
            event_waits: 0,
        }
    }
}

impl WindowBoundary for TestWindow {
    fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    fn wait_events(&mut self) {
        self.event_waits += 1;
        match self.pending_extents.pop_front() {
            Some(extent) => self.extent = extent,
            None => self.closed = true,
        }
    }

    fn should_close(&self) -> bool {
        self.closed
    }

    fn was_resized(&self) -> bool {
        self.resized
    }

    fn reset_resized_flag(&mut self) {
        self.resized = false;
    }
}

/// Runs one loop iteration and returns the slot a frame was recorded in, or
/// `None` if the iteration was skipped.
fn run_frame(
    state: &mut FrameState,
    target: &mut ScriptedTarget,
    window: &mut TestWindow,
) -> RendererResult<Option<usize>> {
    let slot = state.frame_index();
    if state.begin_frame(target, window)?.is_none() {
        return Ok(None);
    }
    state.end_frame(target, window)?;
    Ok(Some(slot))
}

#[test]
fn test_frame_index_cycles_through_slots() {
    let mut state = FrameState::new();
    let mut target = ScriptedTarget::default();
    let mut window = TestWindow::new(EXTENT);

    let slots: Vec<_> = (0..6)
        .map(|_| run_frame(&mut state, &mut target, &mut window).unwrap().unwrap())
        .collect();

    assert_eq!(MAX_FRAMES_IN_FLIGHT, 2);
    assert_eq!(slots, vec![0, 1, 0, 1, 0, 1]);
    assert_eq!(target.recorded_slots, slots);
    assert_eq!(
        target.submitted,
        vec![(0, 0), (1, 1), (2, 0), (0, 1), (1, 0), (2, 1)]
    );
    assert!(target.recreated.is_empty());
}

#[test]
fn test_out_of_date_acquire_recreates_and_keeps_slot() {
    let mut state = FrameState::new();
    let mut target = ScriptedTarget::default();
    let mut window = TestWindow::new(EXTENT);
    run_frame(&mut state, &mut target, &mut window).unwrap();
    target.acquires.push_back(Ok(AcquireStatus::OutOfDate));

    assert_eq!(state.begin_frame(&mut target, &mut window).unwrap(), None);
    assert_eq!(state.phase(), FramePhase::Idle);
    assert_eq!(state.frame_index(), 1);
    assert_eq!(target.recreated, vec![EXTENT]);
    assert_eq!(target.recorded_slots, vec![0]);

    assert_eq!(run_frame(&mut state, &mut target, &mut window).unwrap(), Some(1));
}

#[test]
fn test_suboptimal_present_recreates_and_advances() {
    let mut state = FrameState::new();
    let mut target = ScriptedTarget::default();
    let mut window = TestWindow::new(EXTENT);
    target.presents.push_back(Ok(PresentStatus::Suboptimal));

    assert_eq!(run_frame(&mut state, &mut target, &mut window).unwrap(), Some(0));
    assert_eq!(target.recreated, vec![EXTENT]);
    assert_eq!(state.frame_index(), 1);
    assert_eq!(run_frame(&mut state, &mut target, &mut window).unwrap(), Some(1));
}

#[test]
fn test_out_of_date_present_recreates_and_advances() {
    let mut state = FrameState::new();
    let mut target = ScriptedTarget::default();
    let mut window = TestWindow::new(EXTENT);
    target.presents.push_back(Ok(PresentStatus::OutOfDate));

    run_frame(&mut state, &mut target, &mut window).unwrap();
    assert_eq!(target.recreated.len(), 1);
    assert_eq!(state.frame_index(), 1);
}

#[test]
fn test_resize_flag_recreates_once_and_is_cleared() {
    let mut state = FrameState::new();
    let mut target = ScriptedTarget::default();
    let mut window = TestWindow::new(EXTENT);
    window.resized = true;

    run_frame(&mut state, &mut target, &mut window).unwrap();
    assert!(!window.resized);
    assert_eq!(target.recreated, vec![EXTENT]);

    run_frame(&mut state, &mut target, &mut window).unwrap();
    assert_eq!(target.recreated.len(), 1);
    assert_eq!(state.frame_index(), 0);
}

#[test]
fn test_submit_error_still_advances_slot() {
    let mut state = FrameState::new();
    let mut target = ScriptedTarget::default();
    let mut window = TestWindow::new(EXTENT);
    target
        .presents
        .push_back(Err(RendererError::Present(vk::Result::ERROR_SURFACE_LOST_KHR)));

    state.begin_frame(&mut target, &mut window).unwrap();
    let err = state.end_frame(&mut target, &mut window).unwrap_err();

    assert!(matches!(
        err,
        RendererError::Present(vk::Result::ERROR_SURFACE_LOST_KHR)
    ));
    assert_eq!(state.phase(), FramePhase::Idle);
    assert_eq!(state.frame_index(), 1);
    assert!(target.recreated.is_empty());
}

#[test]
fn test_acquire_error_leaves_state_untouched() {
    let mut state = FrameState::new();
    let mut target = ScriptedTarget::default();
    let mut window = TestWindow::new(EXTENT);
    target
        .acquires
        .push_back(Err(RendererError::Acquire(vk::Result::ERROR_DEVICE_LOST)));

    assert!(state.begin_frame(&mut target, &mut window).is_err());
    assert_eq!(state, FrameState::new());
    assert!(target.recorded_slots.is_empty());
}

#[test]
fn test_slots_alternate_across_recreations() {
    let mut state = FrameState::new();
    let mut target = ScriptedTarget::default();
    let mut window = TestWindow::new(EXTENT);

    let mut slots = Vec::new();
    for i in 0..12 {
        match i % 4 {
            0 => target.acquires.push_back(Ok(AcquireStatus::OutOfDate)),
            1 => target.presents.push_back(Ok(PresentStatus::Suboptimal)),
            2 => window.resized = true,
            _ => {}
        }
        if let Some(slot) = run_frame(&mut state, &mut target, &mut window).unwrap() {
            slots.push(slot);
        }
    }

    assert_eq!(target.recreated.len(), 9);
    assert_eq!(slots, vec![0, 1, 0, 1, 0, 1, 0, 1, 0]);
}

#[test]
fn test_minimized_window_waits_for_extent() {
    let mut state = FrameState::new();
    let mut target = ScriptedTarget::default();
    let mut window = TestWindow::new(vk::Extent2D {
        width: 0,
        height: 0,
    });
    window.pending_extents.extend([
        vk::Extent2D {
            width: 640,
            height: 0,
        },
        EXTENT,
    ]);
    target.acquires.push_back(Ok(AcquireStatus::OutOfDate));

    assert_eq!(state.begin_frame(&mut target, &mut window).unwrap(), None);
    assert_eq!(window.event_waits, 2);
    assert_eq!(target.recreated, vec![EXTENT]);
}

#[test]
fn test_window_closed_while_minimized_skips_recreation() {
    let mut state = FrameState::new();
    let mut target = ScriptedTarget::default();
    let mut window = TestWindow::new(vk::Extent2D {
        width: 0,
        height: 0,
    });
    target.acquires.push_back(Ok(AcquireStatus::OutOfDate));

    assert_eq!(state.begin_frame(&mut target, &mut window).unwrap(), None);
    assert!(window.should_close());
    assert!(target.recreated.is_empty());
}

#[test]
fn test_protocol_violations_do_not_reach_target() {
    let mut state = FrameState::new();
    let mut target = ScriptedTarget::default();
    let mut window = TestWindow::new(EXTENT);

    assert!(matches!(
        state.end_frame(&mut target, &mut window),
        Err(RendererError::FrameNotStarted)
    ));
    assert_eq!(state.frame_index(), 0);

    state.begin_frame(&mut target, &mut window).unwrap();
    assert!(matches!(
        state.begin_frame(&mut target, &mut window),
        Err(RendererError::FrameAlreadyStarted)
    ));
    assert!(state.is_frame_started());
    assert_eq!(target.recorded_slots, vec![0]);
    assert!(target.submitted.is_empty());

    state.end_frame(&mut target, &mut window).unwrap();
    assert_eq!(target.submitted, vec![(0, 0)]);
}

#[test]
fn test_error_messages() {
    assert!(
        RendererError::FrameAlreadyStarted
            .to_string()
            .contains("already in progress")
    );
    assert_eq!(RendererError::FrameNotStarted.to_string(), "No frame in progress");
}
