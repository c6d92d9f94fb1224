//! Thread-safety bounds that only bind when work can leave the calling thread.
//!
//! With the `parallel` feature, policies, algorithms and element types are
//! shared with rayon workers and must be [`Send`]/[`Sync`]. Without it every
//! partition runs on the calling thread, so the bounds collapse to blanket
//! impls and `Rc`-holding policies remain usable.

macro_rules! conditional_marker {
    ($(#[$doc:meta])* $name:ident => $($bound:path),+) => {
        $(#[$doc])*
        #[cfg(feature = "parallel")]
        pub trait $name: $($bound +)+ {}
        #[cfg(feature = "parallel")]
        impl<T: $($bound +)+ ?Sized> $name for T {}

        $(#[$doc])*
        #[cfg(not(feature = "parallel"))]
        pub trait $name {}
        #[cfg(not(feature = "parallel"))]
        impl<T: ?Sized> $name for T {}
    };
}

conditional_marker!(
    /// [`Send`] when the `parallel` feature is enabled.
    MaybeSend => Send
);

conditional_marker!(
    /// [`Sync`] when the `parallel` feature is enabled.
    MaybeSync => Sync
);

conditional_marker!(
    /// [`Send`] + [`Sync`] when the `parallel` feature is enabled.
    MaybeSendSync => Send, Sync
);
