//! ONT ID 注册与授权合约（auth）的方法与参数。

use crate::account::Address;
use crate::codec::{Encode, Sink};

use super::write_string_list;

pub const REG_ID_WITH_PUBLIC_KEY: &str = "regIDWithPublicKey";
pub const ASSIGN_FUNCS_TO_ROLE: &str = "assignFuncsToRole";
pub const ASSIGN_ONT_IDS_TO_ROLE: &str = "assignOntIDsToRole";
pub const VERIFY_TOKEN: &str = "verifyToken";

/// 候选节点所有者角色，授权其调用治理合约的 `registerCandidate`。
pub const CANDIDATE_OWNER_ROLE: &str = "TrionesCandidatePeerOwner";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegIdWithPublicKeyParam {
    pub ont_id: Vec<u8>,
    pub pubkey: Vec<u8>,
}

impl Encode for RegIdWithPublicKeyParam {
    fn encode(&self, sink: &mut Sink) {
        sink.write_var_bytes(&self.ont_id);
        sink.write_var_bytes(&self.pubkey);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncsToRoleParam {
    pub contract_addr: Address,
    pub admin_ont_id: Vec<u8>,
    pub role: Vec<u8>,
    pub func_names: Vec<String>,
    pub key_no: u64,
}

impl Encode for FuncsToRoleParam {
    fn encode(&self, sink: &mut Sink) {
        self.contract_addr.encode(sink);
        sink.write_var_bytes(&self.admin_ont_id);
        sink.write_var_bytes(&self.role);
        write_string_list(sink, &self.func_names);
        sink.write_var_uint(self.key_no);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OntIdsToRoleParam {
    pub contract_addr: Address,
    pub admin_ont_id: Vec<u8>,
    pub role: Vec<u8>,
    pub persons: Vec<Vec<u8>>,
    pub key_no: u64,
}

impl Encode for OntIdsToRoleParam {
    fn encode(&self, sink: &mut Sink) {
        self.contract_addr.encode(sink);
        sink.write_var_bytes(&self.admin_ont_id);
        sink.write_var_bytes(&self.role);
        sink.write_var_uint(self.persons.len() as u64);
        for person in &self.persons {
            sink.write_var_bytes(person);
        }
        sink.write_var_uint(self.key_no);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyTokenParam {
    pub contract_addr: Address,
    pub caller: Vec<u8>,
    pub func_name: String,
    pub key_no: u64,
}

impl Encode for VerifyTokenParam {
    fn encode(&self, sink: &mut Sink) {
        self.contract_addr.encode(sink);
        sink.write_var_bytes(&self.caller);
        sink.write_string(&self.func_name);
        sink.write_var_uint(self.key_no);
    }
}
