use std::future::Future;
use std::net::IpAddr;

/// A trait to reverse-resolve a client address into a hostname
///
/// Implementations must never block the caller: the lookup is awaited and a
/// slow or failing resolver reports `None` instead of an error. Cancellation
/// is the one signal that propagates, by dropping the returned future.
pub trait Resolver {
    fn reverse_lookup(&self, addr: IpAddr) -> impl Future<Output = Option<String>> + Send;
}

/// Resolver that never finds a name, for offline use and tests
pub struct NullResolver;

impl Resolver for NullResolver {
    fn reverse_lookup(&self, _addr: IpAddr) -> impl Future<Output = Option<String>> + Send {
        std::future::ready(None)
    }
}

#[cfg(feature = "server")]
mod system {
    use std::future::Future;
    use std::net::IpAddr;
    use std::time::Duration;

    use hickory_resolver::error::ResolveError;
    use hickory_resolver::TokioAsyncResolver;

    use super::Resolver;

    const LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

    /// Reverse resolver backed by the system DNS configuration
    ///
    /// Every lookup is bounded by a hard timeout so one slow PTR query cannot
    /// stall the request it belongs to.
    pub struct SystemResolver {
        inner: TokioAsyncResolver,
    }

    impl SystemResolver {
        pub fn from_system_conf() -> Result<Self, ResolveError> {
            Ok(Self {
                inner: TokioAsyncResolver::tokio_from_system_conf()?,
            })
        }
    }

    impl Resolver for SystemResolver {
        fn reverse_lookup(&self, addr: IpAddr) -> impl Future<Output = Option<String>> + Send {
            async move {
                match tokio::time::timeout(LOOKUP_TIMEOUT, self.inner.reverse_lookup(addr)).await {
                    Ok(Ok(names)) => names
                        .iter()
                        .next()
                        .map(|ptr| ptr.to_string().trim_end_matches('.').to_string()),
                    // NXDOMAIN, servfail or timeout all degrade to "no name"
                    _ => None,
                }
            }
        }
    }
}

#[cfg(feature = "server")]
pub use system::SystemResolver;
