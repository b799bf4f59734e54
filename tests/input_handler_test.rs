use cgmath::{Point2, Vector2};
use hexscape::{
    config::InputConfig,
    input::{Gesture, InputHandler, PointerInput},
};
use winit::{
    dpi::PhysicalPosition,
    event::{
        DeviceId, ElementState, MouseButton, MouseScrollDelta, Touch, TouchPhase, WindowEvent,
    },
};

use crate::common::test_utils::{Clock, Recorder};

mod common;

fn attached() -> InputHandler {
    let mut handler = InputHandler::new(InputConfig::default());
    handler.attach();
    handler
}

fn p(x: f64, y: f64) -> Point2<f64> {
    Point2::new(x, y)
}

fn device() -> DeviceId {
    DeviceId::dummy()
}

fn touch(id: u64, phase: TouchPhase, x: f64, y: f64) -> WindowEvent {
    WindowEvent::Touch(Touch {
        device_id: device(),
        phase,
        location: PhysicalPosition::new(x, y),
        force: None,
        id,
    })
}

#[test]
fn quick_press_and_release_is_a_click() {
    let clock = Clock::new();
    let mut handler = attached();
    let mut recorder = Recorder::default();

    assert!(!handler.handle(&PointerInput::MouseDown(p(100.0, 100.0)), clock.at(0), &mut recorder));
    assert!(matches!(handler.gesture(), Gesture::Dragging(_)));
    assert!(handler.handle(&PointerInput::MouseUp(p(103.0, 104.0)), clock.at(120), &mut recorder));

    assert_eq!(recorder.clicks(), &[p(103.0, 104.0)]);
    assert!(recorder.pans().is_empty());
    assert_eq!(*handler.gesture(), Gesture::Idle);
}

#[test]
fn long_press_is_not_a_click() {
    let clock = Clock::new();
    let mut handler = attached();
    let mut recorder = Recorder::default();

    handler.handle(&PointerInput::MouseDown(p(100.0, 100.0)), clock.at(0), &mut recorder);
    assert!(!handler.handle(&PointerInput::MouseUp(p(100.0, 100.0)), clock.at(200), &mut recorder));

    assert!(recorder.is_empty());
    assert_eq!(*handler.gesture(), Gesture::Idle);
}

#[test]
fn small_moves_do_not_pan() {
    let clock = Clock::new();
    let mut handler = attached();
    let mut recorder = Recorder::default();

    handler.handle(&PointerInput::MouseDown(p(100.0, 100.0)), clock.at(0), &mut recorder);
    assert!(!handler.handle(&PointerInput::MouseMove(p(110.0, 100.0)), clock.at(10), &mut recorder));
    assert!(!handler.handle(&PointerInput::MouseMove(p(120.0, 100.0)), clock.at(20), &mut recorder));
    assert!(recorder.pans().is_empty());

    // Releasing exactly at the threshold distance is not a click either.
    assert!(!handler.handle(&PointerInput::MouseUp(p(120.0, 100.0)), clock.at(30), &mut recorder));
    assert!(recorder.is_empty());
}

#[test]
fn drag_past_the_threshold_pans_by_the_latest_movement() {
    let clock = Clock::new();
    let mut handler = attached();
    let mut recorder = Recorder::default();

    handler.handle(&PointerInput::MouseDown(p(100.0, 100.0)), clock.at(0), &mut recorder);
    handler.handle(&PointerInput::MouseMove(p(110.0, 100.0)), clock.at(10), &mut recorder);
    assert!(handler.handle(&PointerInput::MouseMove(p(125.0, 100.0)), clock.at(20), &mut recorder));
    assert!(handler.handle(&PointerInput::MouseMove(p(125.0, 90.0)), clock.at(30), &mut recorder));

    assert_eq!(
        recorder.pans(),
        &[Vector2::new(15.0, 0.0), Vector2::new(0.0, -10.0)]
    );

    // A quick release far from the origin is not a click.
    assert!(!handler.handle(&PointerInput::MouseUp(p(125.0, 90.0)), clock.at(40), &mut recorder));
    assert!(recorder.clicks().is_empty());
}

#[test]
fn moving_without_a_press_does_nothing() {
    let clock = Clock::new();
    let mut handler = attached();
    let mut recorder = Recorder::default();

    assert!(!handler.handle(&PointerInput::MouseMove(p(500.0, 500.0)), clock.at(0), &mut recorder));
    assert!(!handler.handle(&PointerInput::MouseUp(p(500.0, 500.0)), clock.at(10), &mut recorder));
    assert!(recorder.is_empty());
}

#[test]
fn leaving_the_surface_ends_the_drag() {
    let clock = Clock::new();
    let mut handler = attached();
    let mut recorder = Recorder::default();

    handler.handle(&PointerInput::MouseDown(p(10.0, 10.0)), clock.at(0), &mut recorder);
    handler.handle(&PointerInput::MouseMove(p(60.0, 10.0)), clock.at(10), &mut recorder);
    handler.handle(&PointerInput::MouseLeave(p(60.0, 10.0)), clock.at(20), &mut recorder);
    assert_eq!(*handler.gesture(), Gesture::Idle);

    let pans = recorder.pans().len();
    handler.handle(&PointerInput::MouseMove(p(90.0, 10.0)), clock.at(30), &mut recorder);
    assert_eq!(recorder.pans().len(), pans);
}

#[test]
fn single_touch_tap_is_a_click() {
    let clock = Clock::new();
    let mut handler = attached();
    let mut recorder = Recorder::default();

    handler.handle(
        &PointerInput::TouchStart {
            touches: vec![p(50.0, 60.0)],
        },
        clock.at(0),
        &mut recorder,
    );
    assert!(handler.handle(
        &PointerInput::TouchEnd {
            touches: vec![],
            changed: vec![p(52.0, 61.0)],
        },
        clock.at(90),
        &mut recorder,
    ));
    assert_eq!(recorder.clicks(), &[p(52.0, 61.0)]);
}

#[test]
fn single_touch_drag_pans() {
    let clock = Clock::new();
    let mut handler = attached();
    let mut recorder = Recorder::default();

    handler.handle(
        &PointerInput::TouchStart {
            touches: vec![p(50.0, 60.0)],
        },
        clock.at(0),
        &mut recorder,
    );
    handler.handle(
        &PointerInput::TouchMove {
            touches: vec![p(50.0, 90.0)],
        },
        clock.at(16),
        &mut recorder,
    );
    assert_eq!(recorder.pans(), &[Vector2::new(0.0, 30.0)]);
}

#[test]
fn pinch_reports_the_change_in_finger_distance() {
    let clock = Clock::new();
    let mut handler = attached();
    let mut recorder = Recorder::default();

    handler.handle(
        &PointerInput::TouchStart {
            touches: vec![p(0.0, 0.0), p(100.0, 0.0)],
        },
        clock.at(0),
        &mut recorder,
    );
    assert_eq!(*handler.gesture(), Gesture::Pinching { distance: 100.0 });

    handler.handle(
        &PointerInput::TouchMove {
            touches: vec![p(0.0, 0.0), p(120.0, 0.0)],
        },
        clock.at(16),
        &mut recorder,
    );
    handler.handle(
        &PointerInput::TouchMove {
            touches: vec![p(0.0, 0.0), p(90.0, 0.0)],
        },
        clock.at(32),
        &mut recorder,
    );
    assert_eq!(recorder.pinches(), &[20.0, -30.0]);
    assert!(recorder.pans().is_empty());

    handler.handle(
        &PointerInput::TouchEnd {
            touches: vec![p(0.0, 0.0)],
            changed: vec![p(90.0, 0.0)],
        },
        clock.at(48),
        &mut recorder,
    );
    assert_eq!(*handler.gesture(), Gesture::Idle);
    assert!(recorder.clicks().is_empty());
}

#[test]
fn first_two_finger_move_only_starts_the_pinch() {
    let clock = Clock::new();
    let mut handler = attached();
    let mut recorder = Recorder::default();

    assert!(!handler.handle(
        &PointerInput::TouchMove {
            touches: vec![p(0.0, 0.0), p(40.0, 0.0)],
        },
        clock.at(0),
        &mut recorder,
    ));
    assert_eq!(*handler.gesture(), Gesture::Pinching { distance: 40.0 });
    assert!(recorder.is_empty());
}

#[test]
fn wheel_zooms_by_its_sign() {
    let clock = Clock::new();
    let mut handler = attached();
    let mut recorder = Recorder::default();

    handler.handle(&PointerInput::Wheel { delta_y: 120.0 }, clock.at(0), &mut recorder);
    handler.handle(&PointerInput::Wheel { delta_y: -3.5 }, clock.at(0), &mut recorder);
    assert!(!handler.handle(&PointerInput::Wheel { delta_y: 0.0 }, clock.at(0), &mut recorder));
    assert!(!handler.handle(&PointerInput::Wheel { delta_y: f64::NAN }, clock.at(0), &mut recorder));

    assert_eq!(recorder.zooms(), &[1.0, -1.0]);
}

#[test]
fn detached_handler_ignores_everything() {
    let clock = Clock::new();
    let mut handler = InputHandler::new(InputConfig::default());
    let mut recorder = Recorder::default();
    assert!(!handler.is_attached());

    handler.handle(&PointerInput::MouseDown(p(1.0, 1.0)), clock.at(0), &mut recorder);
    handler.handle(&PointerInput::MouseUp(p(1.0, 1.0)), clock.at(10), &mut recorder);
    handler.handle(&PointerInput::Wheel { delta_y: 1.0 }, clock.at(20), &mut recorder);

    assert!(recorder.is_empty());
    assert_eq!(*handler.gesture(), Gesture::Idle);
}

#[test]
fn detaching_forgets_the_gesture_in_progress() {
    let clock = Clock::new();
    let mut handler = attached();
    let mut recorder = Recorder::default();

    handler.handle(&PointerInput::MouseDown(p(1.0, 1.0)), clock.at(0), &mut recorder);
    handler.detach();
    assert_eq!(*handler.gesture(), Gesture::Idle);

    handler.attach();
    assert!(!handler.handle(&PointerInput::MouseUp(p(1.0, 1.0)), clock.at(10), &mut recorder));
    assert!(recorder.is_empty());
}

#[test]
fn window_cursor_and_left_button_make_a_click() {
    let clock = Clock::new();
    let mut handler = attached();
    let mut recorder = Recorder::default();

    handler.handle_window_event(
        &WindowEvent::CursorMoved {
            device_id: device(),
            position: PhysicalPosition::new(320.0, 240.0),
        },
        clock.at(0),
        &mut recorder,
    );
    handler.handle_window_event(
        &WindowEvent::MouseInput {
            device_id: device(),
            state: ElementState::Pressed,
            button: MouseButton::Left,
        },
        clock.at(5),
        &mut recorder,
    );
    assert!(handler.handle_window_event(
        &WindowEvent::MouseInput {
            device_id: device(),
            state: ElementState::Released,
            button: MouseButton::Left,
        },
        clock.at(50),
        &mut recorder,
    ));
    assert_eq!(recorder.clicks(), &[p(320.0, 240.0)]);
}

#[test]
fn window_right_button_is_ignored() {
    let clock = Clock::new();
    let mut handler = attached();
    let mut recorder = Recorder::default();

    for (millis, state) in [(0, ElementState::Pressed), (20, ElementState::Released)] {
        handler.handle_window_event(
            &WindowEvent::MouseInput {
                device_id: device(),
                state,
                button: MouseButton::Right,
            },
            clock.at(millis),
            &mut recorder,
        );
    }
    assert!(recorder.is_empty());
}

#[test]
fn window_wheel_scrolling_down_zooms_positive() {
    let clock = Clock::new();
    let mut handler = attached();
    let mut recorder = Recorder::default();

    handler.handle_window_event(
        &WindowEvent::MouseWheel {
            device_id: device(),
            delta: MouseScrollDelta::LineDelta(0.0, -1.0),
            phase: TouchPhase::Moved,
        },
        clock.at(0),
        &mut recorder,
    );
    handler.handle_window_event(
        &WindowEvent::MouseWheel {
            device_id: device(),
            delta: MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 42.0)),
            phase: TouchPhase::Moved,
        },
        clock.at(0),
        &mut recorder,
    );
    assert_eq!(recorder.zooms(), &[1.0, -1.0]);
}

#[test]
fn window_touches_pinch_and_cancel() {
    let clock = Clock::new();
    let mut handler = attached();
    let mut recorder = Recorder::default();

    handler.handle_window_event(&touch(1, TouchPhase::Started, 0.0, 0.0), clock.at(0), &mut recorder);
    handler.handle_window_event(&touch(2, TouchPhase::Started, 50.0, 0.0), clock.at(1), &mut recorder);
    assert_eq!(*handler.gesture(), Gesture::Pinching { distance: 50.0 });

    handler.handle_window_event(&touch(2, TouchPhase::Moved, 80.0, 0.0), clock.at(16), &mut recorder);
    assert_eq!(recorder.pinches(), &[30.0]);

    handler.handle_window_event(&touch(2, TouchPhase::Cancelled, 80.0, 0.0), clock.at(32), &mut recorder);
    assert_eq!(*handler.gesture(), Gesture::Idle);
    assert!(recorder.clicks().is_empty());
}

fn cursor_at(x: f64, y: f64) -> WindowEvent {
    WindowEvent::CursorMoved {
        device_id: device(),
        position: PhysicalPosition::new(x, y),
    }
}

fn left_button(state: ElementState) -> WindowEvent {
    WindowEvent::MouseInput {
        device_id: device(),
        state,
        button: MouseButton::Left,
    }
}

#[test]
fn dense_display_measures_drags_in_logical_pixels() {
    let clock = Clock::new();
    let mut handler = attached();
    handler.set_scale_factor(2.0);
    let mut recorder = Recorder::default();

    // 30 physical pixels are 15 logical pixels at a scale factor of 2.
    handler.handle_window_event(&cursor_at(100.0, 100.0), clock.at(0), &mut recorder);
    handler.handle_window_event(&left_button(ElementState::Pressed), clock.at(0), &mut recorder);
    handler.handle_window_event(&cursor_at(130.0, 100.0), clock.at(50), &mut recorder);
    handler.handle_window_event(&left_button(ElementState::Released), clock.at(100), &mut recorder);

    assert!(recorder.pans().is_empty());
    assert_eq!(recorder.clicks(), &[p(65.0, 50.0)]);
}

#[test]
fn dense_display_pans_by_logical_deltas() {
    let clock = Clock::new();
    let mut handler = attached();
    handler.set_scale_factor(2.0);
    let mut recorder = Recorder::default();

    handler.handle_window_event(&cursor_at(0.0, 0.0), clock.at(0), &mut recorder);
    handler.handle_window_event(&left_button(ElementState::Pressed), clock.at(0), &mut recorder);
    handler.handle_window_event(&cursor_at(60.0, 0.0), clock.at(16), &mut recorder);

    assert_eq!(recorder.pans(), &[Vector2::new(30.0, 0.0)]);
}

#[test]
fn dense_display_pinches_in_logical_pixels() {
    let clock = Clock::new();
    let mut handler = attached();
    handler.set_scale_factor(2.0);
    let mut recorder = Recorder::default();

    handler.handle_window_event(&touch(1, TouchPhase::Started, 0.0, 0.0), clock.at(0), &mut recorder);
    handler.handle_window_event(&touch(2, TouchPhase::Started, 100.0, 0.0), clock.at(0), &mut recorder);
    assert_eq!(*handler.gesture(), Gesture::Pinching { distance: 50.0 });

    handler.handle_window_event(&touch(2, TouchPhase::Moved, 140.0, 0.0), clock.at(16), &mut recorder);
    assert_eq!(recorder.pinches(), &[20.0]);
}

#[test]
fn invalid_scale_factors_are_ignored() {
    let mut handler = attached();
    handler.set_scale_factor(1.5);
    for invalid in [0.0, -2.0, f64::NAN, f64::INFINITY] {
        handler.set_scale_factor(invalid);
        assert_eq!(handler.scale_factor(), 1.5);
    }
}

#[test]
fn restarted_finger_replaces_its_stale_touch() {
    let clock = Clock::new();
    let mut handler = attached();
    let mut recorder = Recorder::default();

    // The end of the first contact was never delivered.
    handler.handle_window_event(&touch(4, TouchPhase::Started, 10.0, 10.0), clock.at(0), &mut recorder);
    handler.handle_window_event(&touch(4, TouchPhase::Started, 40.0, 40.0), clock.at(500), &mut recorder);
    assert!(matches!(handler.gesture(), Gesture::Dragging(_)));

    assert!(handler.handle_window_event(
        &touch(4, TouchPhase::Ended, 41.0, 40.0),
        clock.at(550),
        &mut recorder,
    ));
    assert_eq!(recorder.clicks(), &[p(41.0, 40.0)]);
    assert_eq!(*handler.gesture(), Gesture::Idle);
}
