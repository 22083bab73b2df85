// Copyright (c) 2024 Botho Foundation

pub mod init;
pub mod run;
pub mod show;
