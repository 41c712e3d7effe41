//! ONT / ONG 原生资产合约的转账参数。

use thiserror::Error;

use crate::account::Address;
use crate::codec::{Encode, Sink};

pub const TRANSFER: &str = "transfer";
pub const TRANSFER_FROM: &str = "transferFrom";

#[derive(Debug, Error)]
#[error("转账参数长度不一致: from={from}, to={to}, amount={amount}")]
pub struct TransferListMismatch {
    pub from: usize,
    pub to: usize,
    pub amount: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    pub from: Address,
    pub to: Address,
    pub value: u64,
}

impl Encode for State {
    fn encode(&self, sink: &mut Sink) {
        self.from.encode(sink);
        self.to.encode(sink);
        sink.write_var_uint(self.value);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transfers {
    pub states: Vec<State>,
}

impl Transfers {
    pub fn single(from: Address, to: Address, value: u64) -> Self {
        Self {
            states: vec![State { from, to, value }],
        }
    }

    /// 逐项组合 `from[i] -> to[i]: amount[i]`，三个列表长度必须一致。
    pub fn zip(
        from: &[Address],
        to: &[Address],
        amount: &[u64],
    ) -> Result<Self, TransferListMismatch> {
        if from.len() != to.len() || from.len() != amount.len() {
            return Err(TransferListMismatch {
                from: from.len(),
                to: to.len(),
                amount: amount.len(),
            });
        }
        let states = from
            .iter()
            .zip(to)
            .zip(amount)
            .map(|((from, to), value)| State {
                from: *from,
                to: *to,
                value: *value,
            })
            .collect();
        Ok(Self { states })
    }
}

impl Encode for Transfers {
    fn encode(&self, sink: &mut Sink) {
        sink.write_var_uint(self.states.len() as u64);
        for state in &self.states {
            state.encode(sink);
        }
    }
}

/// ONG 合约 `transferFrom`：`sender` 从 `from` 的授权额度中转出。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferFrom {
    pub sender: Address,
    pub from: Address,
    pub to: Address,
    pub value: u64,
}

impl Encode for TransferFrom {
    fn encode(&self, sink: &mut Sink) {
        self.sender.encode(sink);
        self.from.encode(sink);
        self.to.encode(sink);
        sink.write_var_uint(self.value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_requires_equal_lengths() {
        let a = Address::native(1);
        let b = Address::native(2);
        assert!(Transfers::zip(&[a, b], &[b], &[1, 2]).is_err());

        let transfers = Transfers::zip(&[a, b], &[b, a], &[5, 6]).unwrap();
        assert_eq!(transfers.states.len(), 2);
        assert_eq!(transfers.states[1].to, a);
        assert_eq!(transfers.states[1].value, 6);
    }
}
