use burn::{
    module::Module,
    nn::{Linear, LinearConfig},
    tensor::{activation::sigmoid, backend::Backend, Tensor},
};

use super::CellKind;

/// A single recurrent cell, unrolled over one sequence at a time.
///
/// Gate projections are stacked along the output axis of `input` and `hidden` in the order
/// `[input, forget, cell, output]` for LSTM cells and `[reset, update, new]` for GRU cells.
#[derive(Module, Debug)]
pub struct Cell<B: Backend> {
    input: Linear<B>,
    hidden: Linear<B>,
    gates: usize,
    hidden_dim: usize,
}

/// The carried state of a cell
#[derive(Clone, Debug)]
pub struct CellState<B: Backend> {
    /// `[1, hidden_dim]`
    pub hidden: Tensor<B, 2>,

    /// LSTM memory, `[1, hidden_dim]`
    pub memory: Option<Tensor<B, 2>>,
}

impl<B: Backend> Cell<B> {
    /// Create a cell with random weights
    pub fn new(kind: CellKind, input_dim: usize, hidden_dim: usize, device: &B::Device) -> Self {
        let gates = kind.gates();

        Self {
            input: LinearConfig::new(input_dim, gates * hidden_dim).init(device),
            hidden: LinearConfig::new(hidden_dim, gates * hidden_dim).init(device),
            gates,
            hidden_dim,
        }
    }

    /// The recurrence computed by this cell
    pub fn kind(&self) -> CellKind {
        // `gates` is only ever set from a `CellKind` in `Cell::new`
        CellKind::from_gates(self.gates)
            .unwrap_or_else(|| unreachable!("no recurrent cell has {} gates", self.gates))
    }

    /// The output width
    pub fn hidden_dim(&self) -> usize {
        self.hidden_dim
    }

    fn initial_state(&self, device: &B::Device) -> CellState<B> {
        let zeros = || Tensor::zeros([1, self.hidden_dim], device);

        CellState {
            hidden: zeros(),
            memory: (self.kind() == CellKind::Lstm).then(zeros),
        }
    }

    fn gate(&self, projected: &Tensor<B, 2>, index: usize) -> Tensor<B, 2> {
        let width = self.hidden_dim;

        projected
            .clone()
            .slice([0..1, index * width..(index + 1) * width])
    }

    /// Advance the state by one `[1, input_dim]` step
    pub fn step(&self, input: Tensor<B, 2>, state: CellState<B>) -> CellState<B> {
        let x = self.input.forward(input);
        let h = self.hidden.forward(state.hidden.clone());

        match self.kind() {
            CellKind::Rnn => CellState {
                hidden: (x + h).tanh(),
                memory: None,
            },
            CellKind::Gru => {
                let reset = sigmoid(self.gate(&x, 0) + self.gate(&h, 0));
                let update = sigmoid(self.gate(&x, 1) + self.gate(&h, 1));
                let candidate = (self.gate(&x, 2) + reset * self.gate(&h, 2)).tanh();

                let hidden = candidate.clone() + update * (state.hidden - candidate);

                CellState {
                    hidden,
                    memory: None,
                }
            }
            CellKind::Lstm => {
                let gates = x + h;
                let input_gate = sigmoid(self.gate(&gates, 0));
                let forget_gate = sigmoid(self.gate(&gates, 1));
                let candidate = self.gate(&gates, 2).tanh();
                let output_gate = sigmoid(self.gate(&gates, 3));

                let previous = state
                    .memory
                    .unwrap_or_else(|| Tensor::zeros([1, self.hidden_dim], &gates.device()));
                let memory = forget_gate * previous + input_gate * candidate;

                CellState {
                    hidden: output_gate * memory.clone().tanh(),
                    memory: Some(memory),
                }
            }
        }
    }

    /// Run the cell over `[seq_length, input_dim]` inputs, returning `[seq_length, hidden_dim]`.
    ///
    /// When `reverse` is set the sequence is consumed right to left, but row `t` of the output
    /// still belongs to token `t`.
    pub fn run(&self, inputs: Tensor<B, 2>, reverse: bool) -> Tensor<B, 2> {
        let [seq_length, input_dim] = inputs.dims();
        let mut state = self.initial_state(&inputs.device());

        let order: Vec<usize> = if reverse {
            (0..seq_length).rev().collect()
        } else {
            (0..seq_length).collect()
        };

        let mut outputs = Vec::with_capacity(seq_length);
        for t in order {
            let step = inputs.clone().slice([t..t + 1, 0..input_dim]);

            state = self.step(step, state);
            outputs.push(state.hidden.clone());
        }

        if reverse {
            outputs.reverse();
        }

        Tensor::cat(outputs, 0)
    }
}

#[cfg(test)]
mod tests {
    use burn::{backend::NdArray, tensor::Data};
    use pretty_assertions::assert_eq;

    use super::*;

    type TestBackend = NdArray;

    #[test]
    fn state_shapes_follow_the_cell_kind() {
        let device = Default::default();

        for kind in [CellKind::Rnn, CellKind::Gru, CellKind::Lstm] {
            let cell = Cell::<TestBackend>::new(kind, 3, 5, &device);
            let state = cell.initial_state(&device);

            let next = cell.step(Tensor::ones([1, 3], &device), state);

            assert_eq!(cell.kind(), kind);
            assert_eq!(next.hidden.dims(), [1, 5]);
            assert_eq!(next.memory.is_some(), kind == CellKind::Lstm);
        }
    }

    #[test]
    fn gate_counts_map_back_to_their_kind() {
        for kind in [CellKind::Rnn, CellKind::Gru, CellKind::Lstm] {
            assert_eq!(CellKind::from_gates(kind.gates()), Some(kind));
        }

        assert_eq!(CellKind::from_gates(2), None);
        assert_eq!(CellKind::from_gates(0), None);
    }

    #[test]
    fn reverse_runs_keep_token_order() {
        let device = Default::default();
        let cell = Cell::<TestBackend>::new(CellKind::Rnn, 1, 2, &device);
        let inputs = Tensor::<TestBackend, 2>::from_floats([[1.0], [2.0], [3.0]], &device);

        let backward = cell.run(inputs.clone(), true);

        // The last token has no right context, so it matches a single forward step.
        let last = cell
            .run(inputs.slice([2..3, 0..1]), false)
            .into_data()
            .convert::<f32>();

        let backward_last: Data<f32, 2> = backward.slice([2..3, 0..2]).into_data().convert();

        backward_last.assert_approx_eq(&last, 5);
    }
}
