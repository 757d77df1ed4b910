use burn::{
    module::Param,
    nn::{Dropout, DropoutConfig, Linear},
    prelude::*,
    tensor::activation::{log_softmax, relu, softmax},
};
use rand::{rngs::StdRng, Rng, SeedableRng};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally; do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct DigitMlpConfig {
    pub hidden_units: usize,
    pub dropout:      f64,
    #[config(default = 784)]
    pub input_size:   usize,
    #[config(default = 10)]
    pub num_classes:  usize,
}

impl DigitMlpConfig {
    /// Build the network with Glorot-uniform kernels and zero biases
    /// drawn from a `StdRng` seeded with `seed`, so the same seed always
    /// yields the same starting weights on any backend.
    pub fn init<B: Backend>(&self, seed: u64, device: &B::Device) -> DigitMlp<B> {
        let mut rng = StdRng::seed_from_u64(seed);
        let hidden1 = glorot_linear(self.input_size, self.hidden_units, &mut rng, device);
        let hidden2 = glorot_linear(self.hidden_units, self.hidden_units, &mut rng, device);
        let output  = glorot_linear(self.hidden_units, self.num_classes, &mut rng, device);
        let dropout = DropoutConfig::new(self.dropout).init();
        DigitMlp {
            hidden1, dropout, hidden2, output,
            input_size:  self.input_size,
            num_classes: self.num_classes,
        }
    }
}

fn glorot_linear<B: Backend>(
    d_input:  usize,
    d_output: usize,
    rng:      &mut StdRng,
    device:   &B::Device,
) -> Linear<B> {
    let limit = (6.0 / (d_input + d_output) as f64).sqrt() as f32;
    let weights: Vec<f32> = (0..d_input * d_output)
        .map(|_| rng.gen_range(-limit..limit))
        .collect();
    let weight = Tensor::<B, 2>::from_data(TensorData::new(weights, [d_input, d_output]), device);
    let bias   = Tensor::<B, 1>::zeros([d_output], device);
    Linear {
        weight: Param::from_tensor(weight),
        bias:   Some(Param::from_tensor(bias)),
    }
}

/// 784 → Dense(h, ReLU) → Dropout → Dense(h, ReLU) → Dense(10) → softmax
#[derive(Module, Debug)]
pub struct DigitMlp<B: Backend> {
    pub hidden1:     Linear<B>,
    pub dropout:     Dropout,
    pub hidden2:     Linear<B>,
    pub output:      Linear<B>,
    pub input_size:  usize,
    pub num_classes: usize,
}

impl<B: Backend> DigitMlp<B> {
    /// images: [batch, 784] → logits: [batch, 10]
    ///
    /// Dropout only fires on an autodiff backend, so the same module is
    /// an identity-dropout network once `valid()` strips autodiff.
    pub fn forward(&self, images: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.hidden1.forward(images));
        let x = self.dropout.forward(x);
        let x = relu(self.hidden2.forward(x));
        self.output.forward(x)
    }

    /// Softmax over the class dimension; every row sums to 1.
    pub fn forward_probabilities(&self, images: Tensor<B, 2>) -> Tensor<B, 2> {
        softmax(self.forward(images), 1)
    }

    /// Categorical cross-entropy against one-hot targets, averaged over
    /// the batch. Returns the logits too so callers can score accuracy.
    pub fn forward_loss(
        &self,
        images:  Tensor<B, 2>,
        targets: Tensor<B, 2>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(images);
        let log_probs = log_softmax(logits.clone(), 1);
        let loss = (targets * log_probs).sum_dim(1).mean().neg();
        (loss, logits)
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::features::{FEATURE_LEN, NUM_CLASSES};
    use crate::ml::InferBackend;

    fn probe(device: &<InferBackend as Backend>::Device) -> Tensor<InferBackend, 2> {
        let values: Vec<f32> = (0..2 * FEATURE_LEN).map(|i| (i % 17) as f32 / 16.0).collect();
        Tensor::from_data(TensorData::new(values, [2, FEATURE_LEN]), device)
    }

    #[test]
    fn test_layer_shapes() {
        let device = Default::default();
        let model: DigitMlp<InferBackend> = DigitMlpConfig::new(32, 0.2).init(0, &device);
        assert_eq!(model.hidden1.weight.val().dims(), [FEATURE_LEN, 32]);
        assert_eq!(model.hidden2.weight.val().dims(), [32, 32]);
        assert_eq!(model.output.weight.val().dims(), [32, NUM_CLASSES]);
        assert_eq!(model.input_size(), FEATURE_LEN);
        assert_eq!(model.num_classes, NUM_CLASSES);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let device = Default::default();
        let model: DigitMlp<InferBackend> = DigitMlpConfig::new(16, 0.5).init(3, &device);
        let probs = model
            .forward_probabilities(probe(&device))
            .into_data()
            .to_vec::<f32>()
            .unwrap();
        for row in probs.chunks(NUM_CLASSES) {
            let sum: f32 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5, "row sums to {sum}");
            assert!(row.iter().all(|p| (0.0..=1.0).contains(p)));
        }
    }

    #[test]
    fn test_same_seed_same_weights() {
        let device = Default::default();
        let cfg = DigitMlpConfig::new(8, 0.0);
        let a: DigitMlp<InferBackend> = cfg.init(42, &device);
        let b: DigitMlp<InferBackend> = cfg.init(42, &device);
        let c: DigitMlp<InferBackend> = cfg.init(43, &device);
        let weights = |m: &DigitMlp<InferBackend>| {
            m.hidden1.weight.val().into_data().to_vec::<f32>().unwrap()
        };
        assert_eq!(weights(&a), weights(&b));
        assert_ne!(weights(&a), weights(&c));
    }

    #[test]
    fn test_glorot_bounds_and_zero_bias() {
        let device = Default::default();
        let model: DigitMlp<InferBackend> = DigitMlpConfig::new(16, 0.0).init(1, &device);
        let limit = (6.0 / (FEATURE_LEN + 16) as f64).sqrt() as f32;
        let weights = model.hidden1.weight.val().into_data().to_vec::<f32>().unwrap();
        assert!(weights.iter().all(|w| w.abs() <= limit));
        let bias = model.hidden1.bias.as_ref().unwrap().val().into_data().to_vec::<f32>().unwrap();
        assert!(bias.iter().all(|&b| b == 0.0));
    }

    #[test]
    fn test_loss_is_cross_entropy() {
        let device = Default::default();
        let model: DigitMlp<InferBackend> = DigitMlpConfig::new(8, 0.0).init(5, &device);
        let images = probe(&device);
        let mut onehot = vec![0.0f32; 2 * NUM_CLASSES];
        onehot[4] = 1.0;
        onehot[NUM_CLASSES + 7] = 1.0;
        let targets = Tensor::from_data(TensorData::new(onehot, [2, NUM_CLASSES]), &device);

        let (loss, _) = model.forward_loss(images.clone(), targets);
        let loss = loss.into_scalar().elem::<f32>();

        let probs = model.forward_probabilities(images).into_data().to_vec::<f32>().unwrap();
        let expected = -(probs[4].ln() + probs[NUM_CLASSES + 7].ln()) / 2.0;
        assert!((loss - expected).abs() < 1e-4, "loss {loss} vs {expected}");
    }
}
