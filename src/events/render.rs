//! # Payload and destination capabilities.
//!
//! An [`Event`](crate::events::Event) carries an opaque payload. The core
//! never inspects payload contents; the only thing it can do with one is ask
//! it to render itself into a destination. That contract is split across two
//! traits:
//!
//! - [`Render`] — implemented by payloads: "write your textual form into the
//!   given [`Sink`]". The rendering format is entirely payload-defined.
//! - [`Sink`] — implemented (via blanket impl) by every `io::Write + Send`
//!   destination: files, locked stdout, byte buffers.
//!
//! Which `Render` implementation an event carries is decided once, when the
//! event is constructed. Subscribers never downcast payloads; they either
//! render them or filter them out via [`Render::kind`] /
//! [`Event::label`](crate::events::Event::label).

use std::io;

/// A destination capable of accepting a rendered payload.
///
/// Blanket-implemented for every `io::Write + Send` type, so `File`,
/// `Stdout`, and `Vec<u8>` all qualify without ceremony.
pub trait Sink: io::Write + Send {}

impl<T: io::Write + Send + ?Sized> Sink for T {}

/// Contract for event payloads.
///
/// Implementations are immutable while queued: the same payload instance may
/// be rendered by several subscribers during one delivery pass.
pub trait Render: Send + Sync {
    /// Writes the payload's textual form into `out`.
    fn render(&self, out: &mut dyn Sink) -> io::Result<()>;

    /// Short payload classification, usable by subscriber filters.
    fn kind(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct Plain;

    impl Render for Plain {
        fn render(&self, out: &mut dyn Sink) -> io::Result<()> {
            write!(out, "plain")
        }
    }

    struct Tagged;

    impl Render for Tagged {
        fn render(&self, out: &mut dyn Sink) -> io::Result<()> {
            write!(out, "tagged")
        }

        fn kind(&self) -> &'static str {
            "tagged"
        }
    }

    #[test]
    fn test_default_kind_is_type_name() {
        assert!(Plain.kind().contains("Plain"));
    }

    #[test]
    fn test_kind_override() {
        assert_eq!(Tagged.kind(), "tagged");
    }

    #[test]
    fn test_byte_buffer_is_a_sink() {
        let mut buf: Vec<u8> = Vec::new();
        Tagged.render(&mut buf).unwrap();
        assert_eq!(buf, b"tagged");
    }
}
