//! Outbound ports, implemented by the infrastructure adapters.

mod api_accessor;
mod server_accessor;

pub use api_accessor::ApiAccessor;
pub use server_accessor::ServerAccessor;

#[cfg(test)]
pub use api_accessor::MockApiAccessor;
#[cfg(test)]
pub use server_accessor::MockServerAccessor;
