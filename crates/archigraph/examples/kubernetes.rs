//! Kubernetes platform architecture: developer workflow, CI on Jenkins, and a GKE
//! cluster running an Istio mesh with API, database, CronJob operator and Kafka
//! workloads.
//!
//! Run with `RUST_LOG=debug cargo run --example kubernetes [config.toml]`. Requires
//! the Graphviz `dot` executable unless the configuration points elsewhere.

use archigraph::{
    ConfigurationError, Diagram, DiagramConfig, Error, NodeRef,
    color::Color,
    config::load_config,
    style::{EdgeStyle, LineStyle},
};

fn line(style: LineStyle) -> EdgeStyle {
    EdgeStyle::new().with_line_style(style)
}

fn colored(style: LineStyle, color: &str) -> Result<EdgeStyle, Error> {
    let color: Color = color.parse().map_err(ConfigurationError::from)?;
    Ok(line(style).with_color(color))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let app_config = load_config(std::env::args().nth(1))?;
    let config = DiagramConfig::new("Kubernetes Architecture")
        .with_show(false)
        .with_output_format("svg");
    let mut d = Diagram::open_with(config, app_config)?;

    let source = d.add_node("onprem.client.User", "Developer")?;
    let registry = d.add_node("gcp.devtools.ContainerRegistry", "Container Registry")?;
    let tf = d.add_node("onprem.iac.Terraform", "IaC")?;

    d.chain(source)
        .styled(colored(LineStyle::Dashed, "purple")?.with_label("deploy"))
        .forward(tf)?;

    let users = d.cluster("End Users", |d| d.add_node("onprem.client.Users", "Users"))?;

    let (github, gh_actions, webhook) = d.cluster("Github", |d| {
        Ok((
            d.add_node("onprem.vcs.Github", "GitHub")?,
            d.add_node("onprem.ci.GithubActions", "CI")?,
            d.add_custom_node("Webhook", "src/examples/my_resources/webhook.svg")?,
        ))
    })?;

    // CI/CD infrastructure
    let jenkins_cluster = d.open_cluster("AWS Hosted Jenkins")?;
    let compute_instance = d.add_node("aws.compute.Compute", "Jenkins Server")?;
    let packer = d.add_custom_node("Packer", "src/examples/my_resources/packer.svg")?;
    let (jenkins, docker) = d.cluster("AMI", |d| {
        Ok((
            d.add_node("onprem.ci.Jenkins", "Jenkins")?,
            d.add_node("onprem.container.Docker", "Container Runtime")?,
        ))
    })?;

    d.chain(tf)
        .styled(colored(LineStyle::Bold, "purple")?)
        .forward(compute_instance)?;

    d.chain(source)
        .styled(colored(LineStyle::Bold, "olive")?.with_label("commit"))
        .forward(github)?
        .styled(EdgeStyle::new().with_label("CI"))
        .forward(gh_actions)?
        .styled(EdgeStyle::new().with_label("triggers"))
        .forward(webhook)?
        .forward(compute_instance)?
        .styled(colored(LineStyle::Dotted, "red")?)
        .backward(packer)?
        .styled(colored(LineStyle::Dashed, "darkblue")?)
        .plain(jenkins)?
        .styled(EdgeStyle::new().with_label("buildx"))
        .forward(docker)?
        .styled(EdgeStyle::new().with_label("push"))
        .forward(registry)?;
    d.close_cluster(jenkins_cluster)?;

    // GCP and GKE infrastructure
    let gcp = d.open_cluster("Google Cloud Platform")?;
    let vpc_cluster = d.open_cluster("VPC")?;
    let vpc = d.add_node("gcp.network.VirtualPrivateCloud", "Google VPC")?;
    let bastion = d.add_node("gcp.compute.ComputeEngine", "Bastion Host")?;
    let gke = d.add_node("gcp.compute.GKE", "GKE")?;

    d.chain(vpc)
        .styled(line(LineStyle::Dashed))
        .forward([bastion, gke])?;
    d.chain(bastion)
        .styled(colored(LineStyle::Bold, "darkgreen")?)
        .forward(gke)?;
    d.chain(tf)
        .styled(colored(LineStyle::Bold, "purple")?.with_label("GKE setup"))
        .forward([bastion, vpc, gke])?;
    d.chain(jenkins)
        .styled(colored(LineStyle::Bold, "blue")?)
        .both(bastion)?;

    let gke_cluster = d.open_cluster("GKE Cluster")?;
    let master = d.add_node("k8s.infra.Master", "Master Node")?;
    d.chain(gke)
        .styled(colored(LineStyle::Dashed, "blue")?)
        .forward(master)?;

    let worker1 = d.open_cluster("Worker Node 1")?;
    let node1 = d.add_node("k8s.infra.Node", "Worker Node (us-east1-b)")?;

    let mesh = d.open_cluster("Istio Service Mesh")?;
    let istio_ingress = d.add_node("onprem.network.Istio", "Istio Ingress")?;
    let istio_service = d.add_node("onprem.network.Istio", "Istio Service")?;

    let (hpa, api_deployment, api_rs, api_pods) = d.cluster("Deployment", |d| {
        let helm = d.add_node("k8s.ecosystem.Helm", "Infra Helm Chart")?;
        d.chain(tf)
            .styled(colored(LineStyle::Bold, "purple")?)
            .forward(helm)?;
        let hpa = d.add_node("k8s.clusterconfig.HPA", "Horizontal Pod AutoScaler")?;
        let api_deployment = d.add_node("k8s.compute.Deploy", "API deployment")?;
        let api_rs = d.add_node("k8s.compute.RS", "API ReplicaSet")?;
        let api_pods = d.cluster("API", |d| {
            let mut pods = Vec::new();
            for _ in 0..3 {
                let pod = d.add_node("k8s.compute.Pod", "App")?;
                let envoy = d.add_node("onprem.network.Envoy", "Proxy")?;
                d.connect_plain(pod, envoy)?;
                d.connect_forward(api_rs, pod)?;
                pods.push(pod);
            }
            Ok(pods)
        })?;
        d.connect_forward(helm, hpa)?;
        Ok((hpa, api_deployment, api_rs, api_pods))
    })?;

    d.cluster("Infra Dependencies", |d| {
        let helm = d.add_node("k8s.ecosystem.Helm", "Infra Helm Chart")?;
        let pg = d.add_node("onprem.database.Postgresql", "Postgres DB")?;
        let pv = d.add_node("k8s.storage.PV", "Persistent Volume")?;
        let sc = d.add_node("k8s.storage.SC", "Storage Class")?;

        let (db_stateful, pg_hs, db_claims) = d.cluster("Stateful Database", |d| {
            let db_stateful = d.add_node("k8s.compute.STS", "Postgres StatefulSet")?;
            let pg_hs = d.add_node("k8s.network.SVC", "Postgres Headless SVC")?;
            let mut claims: Vec<NodeRef> = Vec::new();
            for _ in 0..3 {
                let pod = d.add_node("k8s.compute.Pod", "App-DB")?;
                let pvc = d.add_node("k8s.storage.PVC", "PVC")?;
                d.chain(pod).plain(db_stateful)?.plain(pvc)?;
                d.chain(pg_hs).forward(pod)?.forward(pvc)?;
                claims.push(pvc);
            }
            Ok((db_stateful, pg_hs, claims))
        })?;

        d.chain(db_claims).backward(pv)?.backward(sc)?;
        d.chain(tf)
            .styled(colored(LineStyle::Bold, "purple")?)
            .forward(helm)?
            .forward(pg)?
            .forward(db_stateful)?;
        d.connect_forward(pg, pg_hs)?;

        let orange = colored(LineStyle::Bold, "orange")?;
        d.chain(pg_hs)
            .styled(orange.clone())
            .backward(istio_service)?
            .styled(orange)
            .backward(api_pods.clone())?;
        Ok(())
    })?;

    let job = d.cluster("Custom CronJob Kubernetes Operator", |d| {
        let operator = d.add_node("k8s.compute.Pod", "k8s operator")?;
        let custom_resource = d.add_node("k8s.compute.Pod", "Custom Resource")?;
        let crd = d.add_node("k8s.others.CRD", "Custom Resource Definition")?;
        let cron_job = d.add_node("k8s.compute.Cronjob", "CronJob")?;
        let job = d.add_node("k8s.compute.Job", "Job")?;
        let (cm, secret) = d.cluster("CronJob Configuration", |d| {
            Ok((
                d.add_node("k8s.podconfig.CM", "ConfigMap")?,
                d.add_node("k8s.podconfig.Secret", "Secret")?,
            ))
        })?;

        d.chain(source)
            .styled(colored(LineStyle::Bold, "purple")?)
            .forward(operator)?
            .forward(crd)?;
        d.chain(crd)
            .styled(line(LineStyle::Dashed))
            .both(custom_resource)?;

        let magenta = colored(LineStyle::Dotted, "magenta")?;
        d.chain(api_pods.clone()).styled(magenta.clone()).forward(cm)?;
        d.chain(api_pods.clone()).styled(magenta).forward(secret)?;

        let orange = colored(LineStyle::Bold, "orange")?;
        d.chain(api_pods.clone())
            .styled(orange.clone())
            .forward(istio_service)?
            .styled(orange)
            .forward(custom_resource)?
            .forward(cron_job)?
            .forward(job)?;

        d.chain(cm).styled(line(LineStyle::Dashed)).forward(job)?;
        d.chain(secret).styled(line(LineStyle::Dashed)).forward(job)?;
        Ok(job)
    })?;

    d.cluster("Kafka Cluster", |d| {
        let helm = d.add_node("k8s.ecosystem.Helm", "Infra Helm Chart")?;
        d.chain(tf)
            .styled(colored(LineStyle::Bold, "purple")?)
            .forward(helm)?;
        let producer = d.add_node("k8s.compute.Pod", "Producer")?;
        let consumer_db = d.add_node("onprem.database.Postgresql", "Consumer DB")?;

        let (zookeeper, brokers, consumers) = d.cluster("Kafka StatefulSet", |d| {
            let zookeeper = d.add_node("onprem.network.Zookeeper", "Zookeeper")?;
            let svc = d.add_node("k8s.network.SVC", "Kafka Headless SVC")?;
            let mut brokers = Vec::new();
            let mut consumers = Vec::new();
            for _ in 0..3 {
                let consumer = d.add_node("k8s.compute.Pod", "Consumer")?;
                let broker = d.add_node("onprem.queue.Kafka", "Kafka Broker")?;
                let darkred = colored(LineStyle::Dashed, "darkred")?;
                d.chain(broker)
                    .styled(darkred.clone())
                    .backward(svc)?
                    .styled(darkred.with_label("Subscribe"))
                    .backward(consumer)?;
                brokers.push(broker);
                consumers.push(consumer);
            }
            Ok((zookeeper, brokers, consumers))
        })?;

        let lightpink = colored(LineStyle::Dashed, "lightpink")?;
        d.chain(helm).styled(lightpink.clone()).forward(zookeeper)?;
        d.chain(helm).styled(lightpink.clone()).forward(consumer_db)?;
        d.chain(helm).styled(lightpink).forward(brokers.clone())?;
        d.chain(zookeeper)
            .styled(line(LineStyle::Dotted))
            .both(brokers.clone())?;
        d.chain(job).styled(line(LineStyle::Bold)).forward(producer)?;
        d.chain(producer)
            .styled(colored(LineStyle::Bold, "darkgreen")?)
            .forward(brokers)?;
        d.connect_forward(consumers, consumer_db)?;
        Ok(())
    })?;

    d.close_cluster(mesh)?;
    d.close_cluster(worker1)?;

    let node2 = d.cluster("Worker Node 2 \n (Similar to Worker Node 1)", |d| {
        d.add_node("k8s.infra.Node", "Worker Node (us-east1-c)")
    })?;
    let node3 = d.cluster("Worker Node 3 \n (Similar to Worker Node 1)", |d| {
        d.add_node("k8s.infra.Node", "Worker Node (us-east1-d)")
    })?;
    d.chain(master)
        .styled(line(LineStyle::Bold))
        .forward([node1, node2, node3])?;
    d.close_cluster(gke_cluster)?;
    d.close_cluster(vpc_cluster)?;

    d.chain(istio_ingress)
        .forward(hpa)?
        .forward(api_deployment)?
        .forward(api_rs)?
        .forward(api_pods.clone())?;
    d.chain(users)
        .styled(colored(LineStyle::Bold, "darkgreen")?)
        .both(istio_ingress)?;
    d.chain(istio_ingress)
        .styled(colored(LineStyle::Bold, "orange")?)
        .both(api_pods)?;
    d.close_cluster(gcp)?;

    // hosted website server
    d.cluster("Hosted Website", |d| {
        let server = d.add_node("onprem.compute.Server", "www.northeastern.edu")?;
        d.chain(job).styled(line(LineStyle::Dashed)).forward(server)?;
        d.chain(job).styled(line(LineStyle::Dashed)).backward(server)?;
        Ok(())
    })?;

    let output = d.close()?;
    println!("{}", output.path().display());
    Ok(())
}
