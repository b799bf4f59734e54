//! Turning raw pointer and touch input into clicks, pans and zooms.
//!
//! [`InputHandler`] is a small state machine over [`Gesture`]. It is fed
//! DOM-like [`PointerInput`] events, either directly or through
//! [`InputHandler::handle_window_event`] which converts winit's window events,
//! and reports what it recognised to a [`GestureTarget`]:
//!
//! - a press released quickly without travelling far is a click
//! - a press that travels past the distance threshold pans by the movement
//!   since the previous sample
//! - two touches pinch by the change of the distance between them
//! - the wheel zooms by the sign of its vertical delta

use cgmath::{MetricSpace, Point2, Vector2};
use instant::{Duration, Instant};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};

use crate::{
    config::InputConfig,
    utils::{physical_to_logical, pinch_distance, touch_to_pointer},
};

/// Receives the gestures an [`InputHandler`] recognises.
pub trait GestureTarget {
    /// A short press without movement, at the release position.
    fn on_click(&mut self, position: Point2<f64>);
    /// Pointer movement in surface pixels since the previous sample.
    fn on_pan(&mut self, delta: Vector2<f32>);
    /// Change of the distance between two touches since the previous sample.
    fn on_pinch(&mut self, delta: f32);
    /// `1.0` when scrolling down, `-1.0` when scrolling up.
    fn on_zoom(&mut self, delta: f32);
}

/// Raw input in surface pixels, named after the DOM events it mirrors.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerInput {
    MouseDown(Point2<f64>),
    MouseMove(Point2<f64>),
    MouseUp(Point2<f64>),
    /// The pointer left the surface; ends a drag like a release.
    MouseLeave(Point2<f64>),
    TouchStart {
        touches: Vec<Point2<f64>>,
    },
    TouchMove {
        touches: Vec<Point2<f64>>,
    },
    /// Also used for cancelled touches.
    TouchEnd {
        /// Touches still on the surface.
        touches: Vec<Point2<f64>>,
        /// Touches that were lifted.
        changed: Vec<Point2<f64>>,
    },
    /// Positive when scrolling down.
    Wheel {
        delta_y: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    pub started: Instant,
    pub origin: Point2<f64>,
    pub previous: Point2<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Idle,
    Dragging(Drag),
    Pinching { distance: f64 },
}

#[derive(Debug)]
pub struct InputHandler {
    config: InputConfig,
    attached: bool,
    gesture: Gesture,
    /// Physical pixels per logical pixel of the surface.
    scale_factor: f64,
    /// Last cursor position, in logical pixels.
    cursor: Point2<f64>,
    /// Active touches by winit finger id, in the order they started.
    touches: Vec<(u64, Point2<f64>)>,
}

impl InputHandler {
    /// A detached handler; call [`InputHandler::attach`] to start listening.
    pub fn new(config: InputConfig) -> Self {
        Self {
            config,
            attached: false,
            gesture: Gesture::Idle,
            scale_factor: 1.0,
            cursor: Point2::new(0.0, 0.0),
            touches: Vec::new(),
        }
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Stop listening and forget any gesture in progress.
    pub fn detach(&mut self) {
        self.attached = false;
        self.gesture = Gesture::Idle;
        self.touches.clear();
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Set the window's scale factor. Window events are converted to logical
    /// pixels with it, so thresholds and pan deltas do not depend on the
    /// display density. Non-positive or non-finite factors are ignored.
    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        if !scale_factor.is_normal() || scale_factor <= 0.0 {
            log::warn!("Ignoring invalid scale factor {}", scale_factor);
            return;
        }
        self.scale_factor = scale_factor;
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Feed one event. Returns whether a gesture was reported to `target`.
    pub fn handle<T: GestureTarget + ?Sized>(
        &mut self,
        input: &PointerInput,
        now: Instant,
        target: &mut T,
    ) -> bool {
        if !self.attached {
            return false;
        }
        match input {
            PointerInput::MouseDown(position) => {
                self.press(*position, now);
                false
            }
            PointerInput::MouseMove(position) => self.drag_to(*position, target),
            PointerInput::MouseUp(position) | PointerInput::MouseLeave(position) => {
                self.release(*position, now, target)
            }
            PointerInput::TouchStart { touches } => {
                match touches.as_slice() {
                    [only] => self.press(*only, now),
                    [first, second] => {
                        self.gesture = Gesture::Pinching {
                            distance: pinch_distance(*first, *second),
                        };
                    }
                    _ => {}
                }
                false
            }
            PointerInput::TouchMove { touches } => match touches.as_slice() {
                [only] => self.drag_to(*only, target),
                [first, second] => self.pinch_to(pinch_distance(*first, *second), target),
                _ => false,
            },
            PointerInput::TouchEnd { touches, changed } => match self.gesture {
                Gesture::Dragging(_) => match changed.first() {
                    Some(lifted) => self.release(*lifted, now, target),
                    None => {
                        self.gesture = Gesture::Idle;
                        false
                    }
                },
                Gesture::Pinching { .. } => {
                    self.gesture = match touches.as_slice() {
                        [first, second, ..] => Gesture::Pinching {
                            distance: pinch_distance(*first, *second),
                        },
                        _ => Gesture::Idle,
                    };
                    false
                }
                Gesture::Idle => false,
            },
            PointerInput::Wheel { delta_y } => {
                if *delta_y == 0.0 || !delta_y.is_finite() {
                    return false;
                }
                target.on_zoom(delta_y.signum() as f32);
                true
            }
        }
    }

    fn press(&mut self, position: Point2<f64>, now: Instant) {
        self.gesture = Gesture::Dragging(Drag {
            started: now,
            origin: position,
            previous: position,
        });
    }

    fn drag_to<T: GestureTarget + ?Sized>(&mut self, position: Point2<f64>, target: &mut T) -> bool {
        let Gesture::Dragging(drag) = &mut self.gesture else {
            return false;
        };
        let delta = position - drag.previous;
        drag.previous = position;
        if drag.origin.distance(position) > self.config.drag_distance_threshold {
            target.on_pan(Vector2::new(delta.x as f32, delta.y as f32));
            return true;
        }
        false
    }

    fn pinch_to<T: GestureTarget + ?Sized>(&mut self, distance: f64, target: &mut T) -> bool {
        let previous = match self.gesture {
            Gesture::Pinching { distance } => Some(distance),
            _ => None,
        };
        self.gesture = Gesture::Pinching { distance };
        match previous {
            Some(previous) => {
                target.on_pinch((distance - previous) as f32);
                true
            }
            None => false,
        }
    }

    fn release<T: GestureTarget + ?Sized>(
        &mut self,
        position: Point2<f64>,
        now: Instant,
        target: &mut T,
    ) -> bool {
        let Gesture::Dragging(drag) = std::mem::replace(&mut self.gesture, Gesture::Idle) else {
            return false;
        };
        let held = if now > drag.started {
            now.duration_since(drag.started)
        } else {
            Duration::ZERO
        };
        let travelled = drag.origin.distance(position);
        if held < self.config.drag_time_threshold && travelled < self.config.drag_distance_threshold
        {
            log::debug!("Click at ({:.1}, {:.1})", position.x, position.y);
            target.on_click(position);
            return true;
        }
        false
    }

    /// Convert a winit window event and feed it through [`InputHandler::handle`].
    ///
    /// Positions are converted from physical to logical pixels. Only the left
    /// mouse button takes part in gestures. Wheel deltas are flipped so that
    /// scrolling down is positive.
    pub fn handle_window_event<T: GestureTarget + ?Sized>(
        &mut self,
        event: &WindowEvent,
        now: Instant,
        target: &mut T,
    ) -> bool {
        if let WindowEvent::ScaleFactorChanged { scale_factor, .. } = event {
            self.set_scale_factor(*scale_factor);
            return false;
        }
        if !self.attached {
            return false;
        }
        let input = match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = physical_to_logical(*position, self.scale_factor);
                PointerInput::MouseMove(self.cursor)
            }
            WindowEvent::CursorLeft { .. } => PointerInput::MouseLeave(self.cursor),
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => PointerInput::MouseDown(self.cursor),
                ElementState::Released => PointerInput::MouseUp(self.cursor),
            },
            WindowEvent::MouseWheel { delta, .. } => {
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -f64::from(*y),
                    MouseScrollDelta::PixelDelta(position) => -position.y,
                };
                PointerInput::Wheel { delta_y }
            }
            WindowEvent::Touch(touch) => {
                let location = touch_to_pointer(touch, self.scale_factor);
                match touch.phase {
                    TouchPhase::Started => {
                        // A finger that starts again without having ended
                        // replaces its stale entry.
                        self.touches.retain(|(id, _)| *id != touch.id);
                        self.touches.push((touch.id, location));
                        PointerInput::TouchStart {
                            touches: self.touch_points(),
                        }
                    }
                    TouchPhase::Moved => {
                        if let Some(entry) = self.touches.iter_mut().find(|(id, _)| *id == touch.id)
                        {
                            entry.1 = location;
                        }
                        PointerInput::TouchMove {
                            touches: self.touch_points(),
                        }
                    }
                    TouchPhase::Ended | TouchPhase::Cancelled => {
                        self.touches.retain(|(id, _)| *id != touch.id);
                        PointerInput::TouchEnd {
                            touches: self.touch_points(),
                            changed: vec![location],
                        }
                    }
                }
            }
            _ => return false,
        };
        self.handle(&input, now, target)
    }

    fn touch_points(&self) -> Vec<Point2<f64>> {
        self.touches.iter().map(|(_, point)| *point).collect()
    }
}
