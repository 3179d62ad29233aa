// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! The host-supplied opaque variable-value hook: the builder never
//! interprets a `Variable`'s default value, only stores it and releases it
//! once the variable has been delivered to the consumer.

/// Implemented by the embedding application for its own value representation
/// `V`. The builder calls [`ValueInterface::delete_value`] immediately after
/// each `Variable` is handed to the `addNode` consumer, bounding peak memory
/// rather than waiting for the whole load to finish.
pub trait ValueInterface<V> {
    /// Release any resources owned by `value`. Called exactly once per
    /// `Variable` that carried a value, in emission order.
    fn delete_value(&mut self, value: V);
}

/// A [`ValueInterface`] that does nothing, for hosts whose value type owns no
/// external resources (plain `Drop` handles everything).
#[derive(Debug, Default)]
pub struct NoopValueInterface;

impl<V> ValueInterface<V> for NoopValueInterface {
    fn delete_value(&mut self, _value: V) {}
}
