//! Camera acquisition with a preferred-then-any fallback.
//!
//! No device backend ships with the crate. A platform integration implements
//! [`CameraBackend`] and hands it to [`capture_background`].

use image::RgbaImage;

use crate::editor::Editor;
use crate::error::{CameraError, CameraResult};

/// Which camera to ask the device for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingConstraint {
    /// The rear, world-facing camera
    Environment,
    Any,
}

/// A failure reported by a camera backend, named the way the platform names it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraFailure {
    pub name: String,
    pub message: String,
}

impl CameraFailure {
    pub fn new(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            message: message.to_string(),
        }
    }

    pub fn classify(&self) -> CameraError {
        match self.name.as_str() {
            "NotFoundError" | "DevicesNotFoundError" => CameraError::NotFound,
            "NotAllowedError" | "PermissionDeniedError" => CameraError::NotAllowed,
            _ => CameraError::Other(self.message.clone()),
        }
    }
}

/// An open camera
pub trait CameraStream {
    /// Grabs the current frame, if one is available yet
    fn capture_frame(&mut self) -> Option<RgbaImage>;

    fn stop(&mut self);
}

pub trait CameraBackend {
    type Stream: CameraStream;

    fn open(&mut self, facing: FacingConstraint) -> Result<Self::Stream, CameraFailure>;
}

/// Tries the environment-facing camera, then any camera. Only the second
/// failure is reported, classified.
pub fn acquire_camera<B: CameraBackend>(backend: &mut B) -> CameraResult<B::Stream> {
    match backend.open(FacingConstraint::Environment) {
        Ok(stream) => Ok(stream),
        Err(first) => {
            log::warn!("Could not get environment camera, trying fallback: {}", first.message);
            backend.open(FacingConstraint::Any).map_err(|failure| {
                log::error!("Error accessing any camera: {} ({})", failure.message, failure.name);
                failure.classify()
            })
        }
    }
}

/// Opens a camera, grabs one frame and makes it the editor's background.
/// The stream is stopped either way. Returns false when no frame was ready.
pub fn capture_background<B: CameraBackend>(editor: &mut Editor, backend: &mut B) -> CameraResult<bool> {
    let mut stream = acquire_camera(backend)?;
    let frame = stream.capture_frame();
    stream.stop();
    match frame {
        Some(frame) => {
            log::info!("Captured {}x{} camera frame", frame.width(), frame.height());
            editor.import_background(frame);
            Ok(true)
        }
        None => {
            log::warn!("Camera opened but produced no frame");
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;
    use std::rc::Rc;

    struct FakeStream {
        frame: Option<RgbaImage>,
        stopped: Rc<Cell<bool>>,
    }

    impl CameraStream for FakeStream {
        fn capture_frame(&mut self) -> Option<RgbaImage> {
            self.frame.clone()
        }

        fn stop(&mut self) {
            self.stopped.set(true);
        }
    }

    /// Fails the requests listed in `failures`, in order
    struct FakeBackend {
        failures: Vec<CameraFailure>,
        requests: Vec<FacingConstraint>,
        frame: Option<RgbaImage>,
        stopped: Rc<Cell<bool>>,
    }

    impl FakeBackend {
        fn new(failures: Vec<CameraFailure>) -> Self {
            Self {
                failures,
                requests: Vec::new(),
                frame: Some(RgbaImage::new(4, 3)),
                stopped: Rc::new(Cell::new(false)),
            }
        }
    }

    impl CameraBackend for FakeBackend {
        type Stream = FakeStream;

        fn open(&mut self, facing: FacingConstraint) -> Result<FakeStream, CameraFailure> {
            self.requests.push(facing);
            if self.failures.is_empty() {
                Ok(FakeStream {
                    frame: self.frame.clone(),
                    stopped: Rc::clone(&self.stopped),
                })
            } else {
                Err(self.failures.remove(0))
            }
        }
    }

    #[test]
    fn test_falls_back_to_any_camera() {
        let mut backend = FakeBackend::new(vec![CameraFailure::new("OverconstrainedError", "no rear camera")]);
        let mut stream = acquire_camera(&mut backend).unwrap();
        assert_eq!(backend.requests, [FacingConstraint::Environment, FacingConstraint::Any]);
        assert!(stream.capture_frame().is_some());
    }

    #[test]
    fn test_second_failure_is_classified() {
        let mut backend = FakeBackend::new(vec![
            CameraFailure::new("NotFoundError", "none"),
            CameraFailure::new("PermissionDeniedError", "denied"),
        ]);
        assert_eq!(acquire_camera(&mut backend).err(), Some(CameraError::NotAllowed));
    }

    #[test]
    fn test_unknown_failure_keeps_message() {
        let failure = CameraFailure::new("AbortError", "device busy");
        assert_eq!(failure.classify(), CameraError::Other("device busy".into()));
        assert_eq!(CameraFailure::new("DevicesNotFoundError", "").classify(), CameraError::NotFound);
    }

    #[test]
    fn test_captured_frame_becomes_the_background() {
        let mut editor = Editor::new(400, 300);
        let mut backend = FakeBackend::new(Vec::new());
        backend.frame = Some(RgbaImage::new(200, 100));

        assert_eq!(capture_background(&mut editor, &mut backend), Ok(true));
        assert!(backend.stopped.get());
        assert!(editor.doc.background().is_some());
        assert_eq!((editor.doc.width(), editor.doc.height()), (400, 200));
        assert!(editor.can_undo());
    }

    #[test]
    fn test_capture_without_frame_leaves_document_alone() {
        let mut editor = Editor::new(400, 300);
        let mut backend = FakeBackend::new(Vec::new());
        backend.frame = None;

        assert_eq!(capture_background(&mut editor, &mut backend), Ok(false));
        assert!(backend.stopped.get());
        assert!(editor.doc.background().is_none());
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_capture_reports_classified_failure() {
        let mut editor = Editor::new(400, 300);
        let mut backend = FakeBackend::new(vec![
            CameraFailure::new("OverconstrainedError", "no rear camera"),
            CameraFailure::new("NotFoundError", "no camera"),
        ]);
        assert_eq!(capture_background(&mut editor, &mut backend), Err(CameraError::NotFound));
        assert!(editor.doc.background().is_none());
    }
}
