use stepwise_nn::data::make_shape_dataset;
use stepwise_nn::{
    DatasetChoice, LmsService, MlpConfig, MlpService, PerceptronConfig, PerceptronService,
};

#[test]
fn perceptron_service_walks_the_dataset_in_order() {
    let mut svc = PerceptronService::new(DatasetChoice::Or, PerceptronConfig::default()).unwrap();
    let xs: Vec<Vec<f64>> = (0..4).map(|_| svc.step().unwrap().x).collect();
    assert_eq!(
        xs,
        vec![
            vec![-1.0, -1.0],
            vec![-1.0, 1.0],
            vec![1.0, -1.0],
            vec![1.0, 1.0]
        ]
    );
    assert_eq!(svc.state().idx, 0);
}

#[test]
fn perceptron_service_switches_dataset() {
    let mut svc = PerceptronService::new(DatasetChoice::Or, PerceptronConfig::default()).unwrap();
    svc.step().unwrap();
    svc.set_dataset(DatasetChoice::Xor).unwrap();
    let state = svc.state();
    assert_eq!(state.dataset, "xor");
    assert_eq!(state.idx, 0);
    assert_eq!(state.w, vec![0.0, 0.0]);
}

#[test]
fn mlp_service_trains_on_custom_board() {
    let good = vec![vec![1, 1]];
    let bad = vec![vec![1], vec![1]];
    let data = make_shape_dataset(&good, &bad, (3, 3), true).unwrap();
    let count = data.len();
    let choice = DatasetChoice::Custom {
        data,
        rows: 3,
        cols: 3,
    };

    let cfg = MlpConfig {
        hidden_dim: 4,
        ..MlpConfig::default()
    };
    let mut svc = MlpService::new(choice, cfg).unwrap();
    let mut last = None;
    for _ in 0..count {
        last = Some(svc.step().unwrap());
    }
    let (snap, internals) = last.unwrap();
    assert_eq!(snap.idx, 0);
    assert_eq!(snap.sample_count, count);
    assert_eq!(snap.hidden.templates.len(), 4);
    assert_eq!(snap.hidden.templates[0].len(), 3);
    assert_eq!(internals.grad_hidden_w.len(), 4);
    assert_eq!(internals.grad_hidden_w[0].len(), 9);
}

#[test]
fn lms_service_cursor_wraps() {
    let mut svc = LmsService::new(DatasetChoice::Or, 0.1).unwrap();
    let idxs: Vec<usize> = (0..5).map(|_| svc.step().unwrap().idx).collect();
    assert_eq!(idxs, vec![1, 2, 3, 0, 1]);
}

#[cfg(feature = "serde")]
#[test]
fn snapshots_serialize_to_json() {
    let mut svc = MlpService::new(DatasetChoice::Xor, MlpConfig::default()).unwrap();
    let (snap, internals) = svc.step().unwrap();

    let json = serde_json::to_value(&internals).unwrap();
    assert_eq!(json["y"], -1);
    assert_eq!(json["y01"], 0);
    assert!(json["grad_hidden_w"].is_array());
    assert!(json["out_b_after"].is_array());

    let text = serde_json::to_string(&snap).unwrap();
    let back: stepwise_nn::service::MlpSnapshot = serde_json::from_str(&text).unwrap();
    assert_eq!(back.dataset, "xor");
    assert_eq!(back.evals.len(), 4);

    let mut p = PerceptronService::new(DatasetChoice::Or, PerceptronConfig::default()).unwrap();
    let value = serde_json::to_value(p.step().unwrap()).unwrap();
    assert_eq!(value["mistake"], true);
    assert_eq!(value["next_x"], serde_json::json!([-1.0, 1.0]));
}
