// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Write;

use log::kv::Key;
use log::kv::Value;
use log::kv::VisitSource;

use crate::Error;

/// Appends ` key=value` for every key-value of a record.
pub(crate) struct KvWriter {
    pub(crate) text: String,
}

impl<'kvs> VisitSource<'kvs> for KvWriter {
    fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), log::kv::Error> {
        write!(&mut self.text, " {key}={value}").map_err(log::kv::Error::boxed)
    }
}

pub(crate) fn visit_error(err: log::kv::Error) -> Error {
    Error::new("failed to visit key-values").with_source(anyhow::anyhow!("{err}"))
}
