/// One-shot handle through which a port delivers the result of an
/// asynchronous request.
///
/// Ports may complete from any thread; the pipeline side decides where the
/// value goes (normally onto its event channel).
pub struct Completion<T> {
    deliver: Box<dyn FnOnce(T) + Send>,
}

impl<T: 'static> Completion<T> {
    pub fn new(deliver: impl FnOnce(T) + Send + 'static) -> Self {
        Self {
            deliver: Box::new(deliver),
        }
    }

    /// A completion whose value is dropped.
    pub fn detached() -> Self {
        Self::new(|_| {})
    }

    pub fn complete(self, value: T) {
        (self.deliver)(value)
    }
}

impl<T> std::fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Completion")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_delivers_value() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let completion = Completion::new(move |v: u32| {
            let _ = tx.send(v);
        });
        completion.complete(42);
        assert_eq!(rx.try_recv().unwrap(), 42);
    }

    #[test]
    fn test_complete_from_other_thread() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let completion = Completion::new(move |v: String| {
            let _ = tx.send(v);
        });
        std::thread::spawn(move || completion.complete("done".to_string()))
            .join()
            .unwrap();
        assert_eq!(rx.try_recv().unwrap(), "done");
    }

    #[test]
    fn test_detached_discards() {
        Completion::<u8>::detached().complete(1);
    }
}
