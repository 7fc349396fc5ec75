//! Command lines executed inside job containers.
//!
//! Entry points run inside the conda environment named after the model
//! type; the exact script flags are owned by the training-script side of
//! the contract, the builders here only render what the requests carry.

use moai_model::{InferenceRequest, JobKey, TrainRequest};

fn conda_entry(model_type: &str, script: &str, key: &JobKey) -> Vec<String> {
    vec![
        "conda".to_string(),
        "run".to_string(),
        "-n".to_string(),
        model_type.to_string(),
        "python".to_string(),
        script.to_string(),
        format!("--project={}", key.project),
        format!("--subproject={}", key.subproject),
        format!("--task={}", key.task),
        format!("--version={}", key.version),
    ]
}

pub fn train_command(req: &TrainRequest) -> Vec<String> {
    let mut cmd = conda_entry(&req.model_type, "train.py", &req.key);

    if let Some(params) = &req.train_params {
        cmd.push(format!("--imgsz={}", params.imgsz));
        cmd.push(format!("--batch-size={}", params.batch_size));
        cmd.push(format!("--weight-type=yolov5{}", params.weight_type));
        cmd.push(format!("--epochs={}", params.epochs));
        cmd.push(format!("--patience={}", params.patience));
        if params.resume {
            cmd.push("--resume".to_string());
        }
    }

    if let Some(hyps) = &req.hyps {
        cmd.push(format!("--lr={}", hyps.lr));
        cmd.push(format!("--degrees={}", hyps.degrees));
        cmd.push(format!("--translate={}", hyps.translate));
        cmd.push(format!("--scale={}", hyps.scale));
        if hyps.hsv {
            cmd.push("--hsv".to_string());
        }
        if hyps.flipud {
            cmd.push("--flipud".to_string());
        }
        if hyps.fliplr {
            cmd.push("--fliplr".to_string());
        }
        if hyps.mosaic {
            cmd.push("--mosaic".to_string());
        }
    }

    cmd
}

/// `model_type` comes from the persisted train config, not the request.
pub fn inference_command(model_type: &str, req: &InferenceRequest) -> Vec<String> {
    let mut cmd = conda_entry(model_type, "detect.py", &req.key);
    cmd.push(format!("--name={}", req.inference_name));
    cmd.push(format!("--imgsz={}", req.imgsz));
    cmd
}

pub fn export_command(model_type: &str, key: &JobKey) -> Vec<String> {
    conda_entry(model_type, "export.py", key)
}

pub fn tensorboard_command(logdir: &str, port: u16) -> Vec<String> {
    vec![
        "tensorboard".to_string(),
        format!("--logdir={logdir}"),
        "--port".to_string(),
        port.to_string(),
        "--bind_all".to_string(),
    ]
}
