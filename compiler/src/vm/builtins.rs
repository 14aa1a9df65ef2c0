//! Built-in word implementations (spec §6), dispatched by canonical name
//! from [`super::vocabulary::resolve_builtin`]. Arithmetic/comparison
//! operators are handled separately by `apply_binary` — this module
//! covers stack shuffling, I/O, and the list/higher-order words.

use super::vocabulary::canon;
use super::{Value, Vm};
use crate::errors::KapilaError;

pub fn call(vm: &mut Vm, name: &'static str) -> Result<(), KapilaError> {
    match name {
        canon::DUP => dup(vm),
        canon::DROP => drop_(vm),
        canon::SWAP => swap(vm),
        canon::OVER => over(vm),
        canon::ROT => rot(vm),
        canon::AND => and(vm),
        canon::OR => or(vm),
        canon::NOT => not(vm),
        canon::PRINT => print(vm),
        canon::LENGTH => length(vm),
        canon::NTH => nth(vm),
        canon::APPEND => append(vm),
        canon::FIRST => first(vm),
        canon::REST => rest(vm),
        canon::CONCAT => concat(vm),
        canon::MAP => map(vm),
        canon::FILTER => filter(vm),
        canon::FOLD => fold(vm),
        canon::EACH => each(vm),
        canon::TIMES => times(vm),
        canon::DO => do_(vm),
        other => unreachable!("resolve_builtin produced an unhandled canonical name: {other}"),
    }
}

fn dup(vm: &mut Vm) -> Result<(), KapilaError> {
    let v = vm.pop()?;
    vm.push(v.clone());
    vm.push(v);
    Ok(())
}

fn drop_(vm: &mut Vm) -> Result<(), KapilaError> {
    vm.pop()?;
    Ok(())
}

fn swap(vm: &mut Vm) -> Result<(), KapilaError> {
    let b = vm.pop()?;
    let a = vm.pop()?;
    vm.push(b);
    vm.push(a);
    Ok(())
}

fn over(vm: &mut Vm) -> Result<(), KapilaError> {
    let b = vm.pop()?;
    let a = vm.pop()?;
    vm.push(a.clone());
    vm.push(b);
    vm.push(a);
    Ok(())
}

/// `a b c -> b c a`
fn rot(vm: &mut Vm) -> Result<(), KapilaError> {
    let c = vm.pop()?;
    let b = vm.pop()?;
    let a = vm.pop()?;
    vm.push(b);
    vm.push(c);
    vm.push(a);
    Ok(())
}

fn and(vm: &mut Vm) -> Result<(), KapilaError> {
    let b = vm.pop_bool()?;
    let a = vm.pop_bool()?;
    vm.push(Value::Bool(a && b));
    Ok(())
}

fn or(vm: &mut Vm) -> Result<(), KapilaError> {
    let b = vm.pop_bool()?;
    let a = vm.pop_bool()?;
    vm.push(Value::Bool(a || b));
    Ok(())
}

fn not(vm: &mut Vm) -> Result<(), KapilaError> {
    let a = vm.pop_bool()?;
    vm.push(Value::Bool(!a));
    Ok(())
}

fn print(vm: &mut Vm) -> Result<(), KapilaError> {
    let v = vm.pop()?;
    let text = v.to_string();
    vm.write_line(&text);
    Ok(())
}

fn length(vm: &mut Vm) -> Result<(), KapilaError> {
    let v = vm.pop()?;
    let n = match &v {
        Value::List(items) => items.len() as i64,
        Value::Str(s) => s.chars().count() as i64,
        other => {
            return Err(KapilaError::runtime(format!(
                "'length' ಗೆ ಪಟ್ಟಿ ಅಥವಾ ಪಠ್ಯ ಬೇಕು, ಸಿಕ್ಕಿದ್ದು {}",
                other.type_name()
            )))
        }
    };
    vm.push(Value::Int(n));
    Ok(())
}

fn nth(vm: &mut Vm) -> Result<(), KapilaError> {
    let index = vm.pop_int()?;
    let list = vm.pop_list()?;
    if index < 0 || index as usize >= list.len() {
        return Err(KapilaError::runtime(format!(
            "'nth' ಸೂಚ್ಯಂಕ ವ್ಯಾಪ್ತಿಯಿಂದ ಹೊರಗಿದೆ: {index}"
        )));
    }
    vm.push(list[index as usize].clone());
    Ok(())
}

fn append(vm: &mut Vm) -> Result<(), KapilaError> {
    let item = vm.pop()?;
    let list = vm.pop_list()?;
    let mut items = (*list).clone();
    items.push(item);
    vm.push(Value::list(items));
    Ok(())
}

fn first(vm: &mut Vm) -> Result<(), KapilaError> {
    let list = vm.pop_list()?;
    let first = list
        .first()
        .cloned()
        .ok_or_else(|| KapilaError::runtime("'first' ಖಾಲಿ ಪಟ್ಟಿಯಲ್ಲಿ ಕರೆಯಲಾಗಿದೆ"))?;
    vm.push(first);
    Ok(())
}

fn rest(vm: &mut Vm) -> Result<(), KapilaError> {
    let list = vm.pop_list()?;
    if list.is_empty() {
        return Err(KapilaError::runtime("'rest' ಖಾಲಿ ಪಟ್ಟಿಯಲ್ಲಿ ಕರೆಯಲಾಗಿದೆ"));
    }
    vm.push(Value::list(list[1..].to_vec()));
    Ok(())
}

fn concat(vm: &mut Vm) -> Result<(), KapilaError> {
    let b = vm.pop()?;
    let a = vm.pop()?;
    match (a, b) {
        (Value::List(a), Value::List(b)) => {
            let mut items = (*a).clone();
            items.extend((*b).iter().cloned());
            vm.push(Value::list(items));
            Ok(())
        }
        (Value::Str(a), Value::Str(b)) => {
            vm.push(Value::str(format!("{a}{b}")));
            Ok(())
        }
        (a, b) => Err(KapilaError::runtime(format!(
            "'concat' ಗೆ ಒಂದೇ ಬಗೆಯ ಪಟ್ಟಿ ಅಥವಾ ಪಠ್ಯ ಬೇಕು, ಸಿಕ್ಕಿದ್ದು {} ಮತ್ತು {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}

fn map(vm: &mut Vm) -> Result<(), KapilaError> {
    let block = vm.pop_block()?;
    let list = vm.pop_list()?;
    let mut out = Vec::with_capacity(list.len());
    for item in list.iter() {
        out.push(vm.call_block_with_value(&block, item.clone())?);
    }
    vm.push(Value::list(out));
    Ok(())
}

fn filter(vm: &mut Vm) -> Result<(), KapilaError> {
    let block = vm.pop_block()?;
    let list = vm.pop_list()?;
    let mut out = Vec::new();
    for item in list.iter() {
        let kept = vm.call_block_with_value(&block, item.clone())?;
        let kept = kept.as_bool().ok_or_else(|| {
            KapilaError::runtime("'filter' ಬ್ಲಾಕ್ ಬೂಲಿಯನ್ ಮೌಲ್ಯ ಹಿಂದಿರುಗಿಸಬೇಕು")
        })?;
        if kept {
            out.push(item.clone());
        }
    }
    vm.push(Value::list(out));
    Ok(())
}

/// Stack order matches the spec's examples: `list acc [block] fold` —
/// the block runs once per item with the running accumulator and the
/// item both pushed (so e.g. `[ + ]` sees `acc item` on top and
/// consumes both), and its single result becomes the next accumulator.
fn fold(vm: &mut Vm) -> Result<(), KapilaError> {
    let block = vm.pop_block()?;
    let mut acc = vm.pop()?;
    let list = vm.pop_list()?;
    for item in list.iter() {
        vm.push(acc);
        vm.push(item.clone());
        vm.call_block(&block)?;
        acc = vm.pop()?;
    }
    vm.push(acc);
    Ok(())
}

fn each(vm: &mut Vm) -> Result<(), KapilaError> {
    let block = vm.pop_block()?;
    let list = vm.pop_list()?;
    for item in list.iter() {
        vm.push(item.clone());
        vm.call_block(&block)?;
    }
    Ok(())
}

/// Runs the block `n` times, pushing the loop index before each call so a
/// block declaring a parameter (e.g. `[ i | ... ]`) can bind it; a block
/// with no declared parameter never touches the pushed index, so it's
/// popped back off after the call (spec §4.4 "passing the loop index
/// then discards it").
fn times(vm: &mut Vm) -> Result<(), KapilaError> {
    let block = vm.pop_block()?;
    let n = vm.pop_int()?;
    if n < 0 {
        return Err(KapilaError::runtime("'times' ಗೆ ಋಣಾತ್ಮಕವಲ್ಲದ ಪೂರ್ಣಾಂಕ ಬೇಕು"));
    }
    for i in 0..n {
        vm.push(Value::Int(i));
        vm.call_block(&block)?;
        if block.params.is_empty() {
            vm.pop()?;
        }
    }
    Ok(())
}

fn do_(vm: &mut Vm) -> Result<(), KapilaError> {
    let block = vm.pop_block()?;
    vm.call_block(&block)
}
