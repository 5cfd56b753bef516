use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;

use crate::kernel::context::RenderContext;
use crate::kernel::error::Result;

/// Produces the render object of an application.
///
/// Invoked exactly once per bootstrap, as soon as options are resolved. Its
/// output becomes part of the final [`RendererApplication`](crate::kernel::RendererApplication).
#[async_trait]
pub trait RenderAdapter: Send + Sync + 'static {
    type Output: Send + Sync + 'static;

    async fn render(&self, context: RenderContext) -> Result<Self::Output>;
}

/// [`RenderAdapter`] backed by an async closure; see [`adapter_fn`].
pub struct FnAdapter<F, R> {
    f: F,
    _output: PhantomData<fn() -> R>,
}

/// Wrap an async closure as a render adapter.
pub fn adapter_fn<F, Fut, R>(f: F) -> FnAdapter<F, R>
where
    F: Fn(RenderContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R>> + Send + 'static,
    R: Send + Sync + 'static,
{
    FnAdapter {
        f,
        _output: PhantomData,
    }
}

#[async_trait]
impl<F, Fut, R> RenderAdapter for FnAdapter<F, R>
where
    F: Fn(RenderContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R>> + Send + 'static,
    R: Send + Sync + 'static,
{
    type Output = R;

    async fn render(&self, context: RenderContext) -> Result<R> {
        (self.f)(context).await
    }
}
