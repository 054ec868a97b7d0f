use std::sync::Mutex;

static BUFFER: Mutex<Option<Vec<String>>> = Mutex::new(None);

/// Start buffering warnings. While active, [`warn`] stores messages instead
/// of writing to stderr, so they do not tear the TUI.
pub fn activate() {
    *BUFFER.lock().unwrap() = Some(Vec::new());
}

/// Stop buffering and return everything collected since [`activate`].
pub fn drain() -> Vec<String> {
    BUFFER.lock().unwrap().take().unwrap_or_default()
}

/// Emit a warning. Buffered if buffering is active, straight to stderr
/// otherwise.
pub fn warn(msg: String) {
    let mut guard = BUFFER.lock().unwrap();
    if let Some(buf) = guard.as_mut() {
        buf.push(msg);
    } else {
        drop(guard);
        eprintln!("{}", msg);
    }
}

/// Like `eprintln!`, routed through the stderr buffer when active.
#[macro_export]
macro_rules! buffered_eprintln {
    ($($arg:tt)*) => {
        $crate::stderr_buffer::warn(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffering_collects_then_drains() {
        activate();
        warn("first".to_string());
        buffered_eprintln!("second {}", 2);
        let messages = drain();
        assert_eq!(messages, vec!["first".to_string(), "second 2".to_string()]);
        // Drained buffer is gone; a second drain is empty.
        assert!(drain().is_empty());
    }
}
