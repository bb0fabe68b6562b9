use wasm_bindgen::prelude::*;

pub mod datagen;
pub mod deductive;
pub mod error;
pub mod grammar;
pub mod lang;
pub mod rank;
pub mod session;
pub mod spec;
pub mod vsa;
pub mod witness;

pub use deductive::{synthesize, Config, ResourceLimits};
pub use error::{ExecutionError, SessionError, SynthesisError};
pub use lang::{Fun, Lit, Value, AST};
pub use rank::Ranked;
pub use session::Session;

/// Learns from `inps[i] -> outs[i]` and runs the top program on every entry
/// of `tests`. Each input is an array of integers.
#[wasm_bindgen(js_name = synthesize)]
pub fn synthesize_js(inps: js_sys::Array, outs: Vec<i32>, tests: js_sys::Array) -> js_sys::Map {
    let obj = js_sys::Map::new();
    let to_vec = |v: JsValue| {
        js_sys::Int32Array::new(&v)
            .to_vec()
            .into_iter()
            .map(Value::from)
            .collect::<Vec<_>>()
    };

    let examples = inps
        .iter()
        .map(&to_vec)
        .zip(outs.into_iter().map(Value::from))
        .collect::<Vec<_>>();

    match synthesize(&examples, &Config::default()) {
        Ok(ranked) => {
            let top = &ranked[0].program;

            let mut error = false;
            let results = js_sys::Array::new();
            for test in tests.iter() {
                match top.run(&to_vec(test)) {
                    Ok(n) => results.push(&JsValue::from_f64(n as f64)),
                    Err(e) => {
                        error = true;
                        results.push(&JsValue::from_str(&e.to_string()))
                    }
                };
            }

            let programs = ranked
                .iter()
                .map(|r| JsValue::from_str(&r.program.to_string()))
                .collect::<js_sys::Array>();

            obj.set(&JsValue::from_str("program"), &JsValue::from_str(&top.to_string()))
                .set(&JsValue::from_str("programs"), &programs)
                .set(&JsValue::from_str("test_results"), &results)
                .set(&JsValue::from_str("error"), &JsValue::from_bool(error))
        }
        Err(e) => obj
            .set(&JsValue::from_str("error"), &JsValue::from_bool(true))
            .set(&JsValue::from_str("message"), &JsValue::from_str(&e.to_string())),
    }
}
