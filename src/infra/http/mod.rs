mod dispatch;
mod middleware;

pub use dispatch::{
    DispatchMode, DispatchState, INCLUDE_MARKER_HEADER, TARGET_HEADER, build_router,
};
