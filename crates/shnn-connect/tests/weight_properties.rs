//! Polarity invariants of weight conversion

use proptest::prelude::*;
use shnn_connect::{convert_batch, convert_scalar, ConnectError, SynapseType};

fn same_sign_batch() -> impl Strategy<Value = Vec<f64>> {
    prop_oneof![
        prop::collection::vec(0.0f64..10.0, 0..32),
        prop::collection::vec(-10.0f64..=0.0, 0..32),
    ]
}

proptest! {
    #[test]
    fn inhibitory_batches_are_non_positive(ws in same_sign_batch()) {
        let converted = convert_batch(ws.clone(), SynapseType::Inhibitory).unwrap();
        prop_assert_eq!(converted.len(), ws.len());
        prop_assert!(converted.iter().all(|&w| w <= 0.0));
    }

    #[test]
    fn excitatory_batches_are_non_negative(ws in prop::collection::vec(0.0f64..10.0, 0..32)) {
        let converted = convert_batch(ws, SynapseType::Excitatory).unwrap();
        prop_assert!(converted.iter().all(|&w| w >= 0.0));
    }

    #[test]
    fn mixed_sign_batches_fail(
        pos in prop::collection::vec(0.001f64..10.0, 1..16),
        neg in prop::collection::vec(-10.0f64..-0.001, 1..16),
        inhibitory in any::<bool>(),
    ) {
        let synapse_type = if inhibitory { SynapseType::Inhibitory } else { SynapseType::Excitatory };
        let mut ws = pos;
        ws.extend(neg);
        let err = convert_batch(ws, synapse_type).unwrap_err();
        prop_assert!(matches!(err, ConnectError::InvalidWeight { .. }), "unexpected error: {}", err);
    }

    #[test]
    fn scalar_inhibitory_is_non_positive(w in -10.0f64..10.0) {
        prop_assert!(convert_scalar(w, SynapseType::Inhibitory).unwrap() <= 0.0);
    }
}

#[test]
fn excitatory_scalar_message_names_value() {
    let err = convert_scalar(-0.5, SynapseType::Excitatory).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("-500"), "unexpected error: {}", msg);
}

#[test]
fn nan_is_a_type_error() {
    assert!(matches!(
        convert_scalar(f64::NAN, SynapseType::Inhibitory),
        Err(ConnectError::WeightType { .. })
    ));
    assert!(matches!(
        convert_batch(vec![0.1, f64::NAN], SynapseType::Excitatory),
        Err(ConnectError::WeightType { .. })
    ));
}
