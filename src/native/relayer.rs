//! 中继链 relayer 管理合约。

use crate::account::Address;
use crate::codec::{Encode, Sink};

pub const REGISTER_RELAYER: &str = "registerRelayer";
pub const REMOVE_RELAYER: &str = "removeRelayer";
pub const APPROVE_REGISTER_RELAYER: &str = "approveRegisterRelayer";
pub const APPROVE_REMOVE_RELAYER: &str = "approveRemoveRelayer";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayerListParam {
    pub address_list: Vec<Address>,
    pub address: Address,
}

impl Encode for RelayerListParam {
    fn encode(&self, sink: &mut Sink) {
        sink.write_var_uint(self.address_list.len() as u64);
        for relayer in &self.address_list {
            relayer.encode(sink);
        }
        self.address.encode(sink);
    }
}

/// 按申请编号审批 relayer 的注册或移除。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApproveRelayerParam {
    pub id: u64,
    pub address: Address,
}

impl Encode for ApproveRelayerParam {
    fn encode(&self, sink: &mut Sink) {
        sink.write_var_uint(self.id);
        self.address.encode(sink);
    }
}
