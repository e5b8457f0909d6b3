//! Drives a network one epoch at a time, the way an interactive front end
//! would, and prints the loss curve and final accuracy.

use nnet::{Activator, Dataset, NetworkConfig};
use rand::Rng;

fn generate_data(num_samples: usize) -> Dataset {
    let mut rng = rand::thread_rng();
    let mut data = Vec::with_capacity(num_samples);
    for _ in 0..num_samples {
        let point = [rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)];
        // A disc inside a ring.
        let class = if point[0] * point[0] + point[1] * point[1] < 0.4 {
            [1.0, 0.0]
        } else {
            [0.0, 1.0]
        };
        data.push((point, class));
    }
    Dataset::from_pairs(&data).expect("generated rows have equal widths")
}

fn main() {
    let training_data = generate_data(1_000);
    let mut network = NetworkConfig::new(2, 2)
        .hidden_layers(&[8, 8])
        .activator(Activator::TanH)
        .learning_rate(0.1)
        .batch_size(10)
        .softmax_output(true)
        .build()
        .expect("valid configuration");

    for layer in network.layer_infos() {
        println!("{:>3} neurons, {}", layer.size, layer.activation);
    }

    for epoch in 1..=150 {
        let report = network
            .train_one_step(&training_data, epoch, false)
            .expect("training data matches the network");
        if epoch % 25 == 0 {
            println!("epoch {:>3}: loss {:.4}", report.epoch, report.loss);
        }
    }

    let test_data = generate_data(200);
    let accuracy = network.test(&test_data).expect("test data matches the network");
    println!("test accuracy: {:.1}%", accuracy * 100.0);
}
