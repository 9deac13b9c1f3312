pub mod hw;

#[derive(Clone, Debug)]
pub struct Event(pub(super) EventConfig);

/// Resolved `(type, config)` pair ready to be written into `perf_event_attr`.
#[derive(Clone, Debug)]
pub(super) struct EventConfig {
    pub ty: u32,
    pub config: u64,
}

macro_rules! try_from {
    ($ty:ty, $value:ident, $impl: expr) => {
        impl TryFrom<&$ty> for crate::event::Event {
            type Error = std::io::Error;

            fn try_from($value: &$ty) -> std::result::Result<Self, Self::Error> {
                $impl
            }
        }

        impl TryFrom<$ty> for crate::event::Event {
            type Error = std::io::Error;

            fn try_from(value: $ty) -> std::result::Result<Self, Self::Error> {
                (&value).try_into()
            }
        }
    };
}
use try_from;
