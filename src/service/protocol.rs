use burn::tensor::backend::Backend;
use serde::{Deserialize, Serialize};

use super::{EvalResponse, HighlightService};
use crate::oracle::OracleSolution;

/// A request, tagged by `op`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Load the checkpoint of one fold of a run
    LoadModel {
        /// The run name
        log_name: String,
        /// The fold
        index: usize,
    },

    /// Predict classes for raw token ids
    EvalModel {
        /// Raw lexer token ids
        ids: Vec<i64>,
    },

    /// Activate the oracle bindings of a language
    LoadLexer {
        /// The language name
        lang: String,
    },

    /// Bind a lexed token stream
    EvalOracle {
        /// `(token_type, text)` pairs
        tokens: Vec<(String, String)>,
    },
}

/// A response. Failures are reported in-band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    /// Model predictions
    Eval(EvalResponse),

    /// Oracle solutions
    Oracle {
        /// One solution per token
        solutions: Vec<OracleSolution>,
    },

    /// A load succeeded
    Loaded {
        /// What was loaded
        loaded: String,
    },

    /// The request failed
    Error {
        /// The error message
        error: String,
    },
}

impl Response {
    fn error(error: impl ToString) -> Self {
        Response::Error {
            error: error.to_string(),
        }
    }
}

/// Apply one request to the service
pub fn handle<B: Backend>(service: &mut HighlightService<B>, request: Request) -> Response {
    let result = match request {
        Request::LoadModel { log_name, index } => service
            .load_model(&log_name, index)
            .map(|_| Response::Loaded {
                loaded: format!("{log_name}/{index}"),
            }),
        Request::EvalModel { ids } => service.eval_model(&ids).map(Response::Eval),
        Request::LoadLexer { lang } => service
            .load_lexer(&lang)
            .map(|language| Response::Loaded {
                loaded: language.to_string(),
            }),
        Request::EvalOracle { tokens } => service
            .eval_oracle(tokens)
            .map(|solutions| Response::Oracle { solutions }),
    };

    result.unwrap_or_else(|e| {
        log::warn!("Request failed: {}", e);
        Response::error(e)
    })
}

/// Parse one JSON line, apply it and serialize the response
pub fn handle_line<B: Backend>(service: &mut HighlightService<B>, line: &str) -> String {
    let response = match serde_json::from_str::<Request>(line) {
        Ok(request) => handle(service, request),
        Err(e) => Response::error(format!("invalid request: {e}")),
    };

    serde_json::to_string(&response)
        .unwrap_or_else(|e| format!(r#"{{"error":"unable to serialize response: {e}"}}"#))
}
